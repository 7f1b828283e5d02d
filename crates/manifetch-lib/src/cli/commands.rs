use crate::cli::args::Command;
use crate::cli::params::FetchParams;
use crate::download::{DownloadOptions, FetchOptions};
use crate::error::ManifetchError;
use crate::manifest::load_manifest;
use crate::progress::ProgressStyle;
use std::path::PathBuf;

pub fn resolve_command(command: Command) -> Result<FetchParams, ManifetchError> {
    let Command {
        manifest_path,
        output_root,
        archive,
        post_install,
        progress,
    } = command;

    let manifest_path = PathBuf::from(manifest_path);
    tracing::info!("Loading manifest from {}", manifest_path.display());
    let manifest = load_manifest(&manifest_path)?;

    let output_root = match output_root {
        Some(output_root) => PathBuf::from(output_root),
        None => executable_dir()?,
    };

    Ok(FetchParams {
        manifest,
        manifest_path,
        output_root,
        options: FetchOptions {
            archive,
            post_install,
            download: DownloadOptions {
                progress_style: ProgressStyle::default(),
                progress_visibility: progress,
            },
        },
    })
}

fn executable_dir() -> Result<PathBuf, ManifetchError> {
    let executable = std::env::current_exe()?;
    executable
        .parent()
        .map(PathBuf::from)
        .ok_or_else(|| ManifetchError::CliArgumentValidation {
            details: format!(
                "Cannot determine the directory of {}. Pass --output-root.",
                executable.display()
            ),
        })
}
