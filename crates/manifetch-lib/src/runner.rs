use crate::download::{FetchOptions, Fetcher};
use crate::error::ManifetchError;
use crate::manifest::Manifest;
use crate::processor::{DatasetProcessor, ProcessedDataset};
use crate::utils::DirectoryContext;
use bzip2::Compression;
use bzip2::write::BzEncoder;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const DOWNLOADS_DIR: &str = "downloads";
pub const ARCHIVE_NAME: &str = "downloads.tar.bz2";

#[derive(Debug, Default)]
pub struct RunSummary {
    pub topics: Vec<(String, Vec<ProcessedDataset>)>,
    /// Set when the downloads directory was packed and removed.
    pub archive: Option<PathBuf>,
}

/// Processes every topic of a manifest below `<output_root>/downloads`.
pub struct ManifestRunner<'a, F: Fetcher> {
    fetcher: &'a F,
    options: FetchOptions,
}

impl<'a, F: Fetcher> ManifestRunner<'a, F> {
    pub fn new(fetcher: &'a F, options: FetchOptions) -> Self {
        Self { fetcher, options }
    }

    pub async fn run(
        &self,
        manifest: &Manifest,
        output_root: &Path,
    ) -> Result<RunSummary, ManifetchError> {
        let output_root = std::path::absolute(output_root)?;
        let downloads_dir = output_root.join(DOWNLOADS_DIR);
        std::fs::create_dir_all(&downloads_dir)?;

        let mut summary = RunSummary::default();
        {
            let _dir = DirectoryContext::enter(&downloads_dir)?;
            let processor = DatasetProcessor::new(self.fetcher, &self.options);

            for (topic, datasets) in manifest.iter() {
                let processed = processor.process_topic(topic, datasets).await?;
                summary.topics.push((topic.to_string(), processed));
            }
        }

        if self.options.archive {
            let archive = archive_downloads(output_root.clone()).await?;
            summary.archive = Some(archive);
        }

        Ok(summary)
    }
}

/// Packs `<output_root>/downloads` into `<output_root>/downloads.tar.bz2` and
/// removes the directory.
pub async fn archive_downloads(output_root: PathBuf) -> Result<PathBuf, ManifetchError> {
    tokio::task::spawn_blocking(move || pack_and_remove(&output_root))
        .await
        .map_err(|e| ManifetchError::Unexpected(e.into()))?
}

fn pack_and_remove(output_root: &Path) -> Result<PathBuf, ManifetchError> {
    let downloads_dir = output_root.join(DOWNLOADS_DIR);
    let archive_path = output_root.join(ARCHIVE_NAME);

    tracing::info!("Creating {}", ARCHIVE_NAME);
    let file = File::create(&archive_path)?;
    let mut builder = tar::Builder::new(BzEncoder::new(file, Compression::default()));
    builder.append_dir_all(DOWNLOADS_DIR, &downloads_dir)?;
    builder.into_inner()?.finish()?;

    tracing::info!("Removing {}/ directory", DOWNLOADS_DIR);
    std::fs::remove_dir_all(&downloads_dir)?;

    Ok(archive_path)
}
