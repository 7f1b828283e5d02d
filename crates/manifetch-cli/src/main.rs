use manifetch_lib::cli::{parse_args, resolve_command, run_fetch};
use manifetch_lib::error::ManifetchError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), ManifetchError> {
    color_eyre::install()?;

    let args = parse_args();
    let params = resolve_command(args.command)?;
    run_fetch(params).await?;

    Ok(())
}
