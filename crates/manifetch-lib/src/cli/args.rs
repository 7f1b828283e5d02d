use crate::progress::ProgressVisibility;
use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;

#[derive(Debug, Clone)]
pub struct Command {
    pub manifest_path: String,
    pub output_root: Option<String>,
    pub archive: bool,
    pub post_install: bool,
    pub progress: ProgressVisibility,
}

pub struct Args {
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProgressArg {
    /// Only when standard error is a terminal
    Auto,
    Always,
    Never,
}

impl From<ProgressArg> for ProgressVisibility {
    fn from(value: ProgressArg) -> Self {
        match value {
            ProgressArg::Auto => ProgressVisibility::Auto,
            ProgressArg::Always => ProgressVisibility::Always,
            ProgressArg::Never => ProgressVisibility::Never,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "manifetch",
    version,
    author = "Nick Guletskii",
    about = "Download files defined in a manifest"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count
    )]
    verbose: u8,

    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help = "The manifest YAML file",
        default_value = "manifest.yml"
    )]
    file: String,

    #[arg(
        long = "archive",
        help = "Archive the downloads directory to downloads.tar.bz2 and remove the downloads directory"
    )]
    archive: bool,

    #[arg(long = "post-install", help = "Run post_install scripts")]
    post_install: bool,

    #[arg(
        short = 'o',
        long = "output-root",
        value_name = "DIR",
        help = "Directory in which downloads/ is created (default: the directory of the executable)"
    )]
    output_root: Option<String>,

    #[arg(
        long = "progress",
        value_name = "WHEN",
        help = "When to draw download progress bars",
        value_enum,
        default_value_t = ProgressArg::Auto
    )]
    progress: ProgressArg,
}

impl Cli {
    fn into_command(self) -> Command {
        Command {
            manifest_path: self.file,
            output_root: self.output_root,
            archive: self.archive,
            post_install: self.post_install,
            progress: self.progress.into(),
        }
    }
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();
    let log_level = log_level(cli.verbose);

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    Args {
        command: cli.into_command(),
    }
}
