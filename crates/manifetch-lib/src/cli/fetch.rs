use crate::cli::FetchParams;
use crate::download::ReqwestFetcher;
use crate::error::ManifetchError;
use crate::processor::DatasetStatus;
use crate::runner::{ManifestRunner, RunSummary};

pub async fn run_fetch(params: FetchParams) -> Result<RunSummary, ManifetchError> {
    let FetchParams {
        manifest,
        manifest_path,
        output_root,
        options,
    } = params;

    tracing::info!(
        "Processing {} topics from {} into {}",
        manifest.len(),
        manifest_path.display(),
        output_root.display()
    );

    let fetcher = ReqwestFetcher::new()?;
    let summary = ManifestRunner::new(&fetcher, options)
        .run(&manifest, &output_root)
        .await?;

    let (downloaded, skipped) = summary
        .topics
        .iter()
        .flat_map(|(_, datasets)| datasets)
        .fold((0usize, 0usize), |(downloaded, skipped), dataset| match dataset.status {
            DatasetStatus::Skipped => (downloaded, skipped + 1),
            DatasetStatus::Downloaded { .. } => (downloaded + 1, skipped),
        });
    tracing::info!(
        "Finished: {} downloaded, {} already present",
        downloaded,
        skipped
    );

    Ok(summary)
}
