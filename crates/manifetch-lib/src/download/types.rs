use crate::progress::{ProgressStyle, ProgressVisibility};

/// How a single download reports its progress.
#[derive(Clone, Debug, Default)]
pub struct DownloadOptions {
    pub progress_style: ProgressStyle,
    pub progress_visibility: ProgressVisibility,
}

/// Run-wide switches for processing a manifest.
#[derive(Clone, Debug, Default)]
pub struct FetchOptions {
    /// Pack the output directory into a single archive once every topic succeeded.
    pub archive: bool,
    /// Execute the `post_install` commands of each dataset.
    pub post_install: bool,
    pub download: DownloadOptions,
}
