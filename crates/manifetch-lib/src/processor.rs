use crate::download::{Fetcher, FetchOptions, download_to_file};
use crate::error::ManifetchError;
use crate::extract::{ArchiveKind, extract_in_background};
use crate::manifest::Dataset;
use crate::post_install::run_post_install;
use crate::utils::{DirectoryContext, filename_from_url};
use crate::verification::verify_sha256;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetStatus {
    /// The output already existed, nothing was fetched.
    Skipped,
    Downloaded {
        bytes: u64,
        extracted: Option<ArchiveKind>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedDataset {
    pub title: String,
    /// Output file, relative to the directory it was processed in.
    pub output: PathBuf,
    pub status: DatasetStatus,
}

/// Fetches the datasets of one topic into the current directory.
pub struct DatasetProcessor<'a, F: Fetcher> {
    fetcher: &'a F,
    options: &'a FetchOptions,
}

impl<'a, F: Fetcher> DatasetProcessor<'a, F> {
    pub fn new(fetcher: &'a F, options: &'a FetchOptions) -> Self {
        Self { fetcher, options }
    }

    /// A single dataset topic becomes one file named after the topic. Multiple
    /// datasets go into a directory named after the topic.
    pub async fn process_topic(
        &self,
        topic: &str,
        datasets: &[Dataset],
    ) -> Result<Vec<ProcessedDataset>, ManifetchError> {
        let mut processed = Vec::with_capacity(datasets.len());
        match datasets {
            [] => {
                tracing::debug!(topic, "Topic has no datasets");
            }
            [dataset] => {
                let result = self.process_file(dataset, Path::new(topic)).await?;
                self.maybe_post_install(dataset, &result.title).await?;
                processed.push(result);
            }
            _ => {
                for dataset in datasets {
                    let result = self.process_dataset(dataset, Path::new(topic)).await?;
                    self.maybe_post_install(dataset, &result.title).await?;
                    processed.push(result);
                }
            }
        }
        Ok(processed)
    }

    /// Downloads `dataset` to `output_file` unless it already exists.
    pub async fn process_file(
        &self,
        dataset: &Dataset,
        output_file: &Path,
    ) -> Result<ProcessedDataset, ManifetchError> {
        let title = dataset
            .title_or(&output_file.to_string_lossy())
            .to_string();

        if output_file.exists() {
            tracing::info!("Skipping {}", title);
            return Ok(ProcessedDataset {
                title,
                output: output_file.to_path_buf(),
                status: DatasetStatus::Skipped,
            });
        }

        tracing::info!("Downloading {}", title);
        let bytes = self.fetch_verified(dataset, output_file).await?;

        Ok(ProcessedDataset {
            title,
            output: output_file.to_path_buf(),
            status: DatasetStatus::Downloaded {
                bytes,
                extracted: None,
            },
        })
    }

    /// Downloads `dataset` into `output_dir` under its URL filename and unpacks it
    /// if it is an archive.
    pub async fn process_dataset(
        &self,
        dataset: &Dataset,
        output_dir: &Path,
    ) -> Result<ProcessedDataset, ManifetchError> {
        std::fs::create_dir_all(output_dir)?;
        let _dir = DirectoryContext::enter(output_dir)?;

        let filename = filename_from_url(&dataset.url)?;
        let title = dataset.title_or(&filename).to_string();
        let output = PathBuf::from(&filename);

        if output.exists() {
            tracing::info!("Skipping download {}", title);
            return Ok(ProcessedDataset {
                title,
                output,
                status: DatasetStatus::Skipped,
            });
        }

        tracing::info!("Downloading {}", title);
        let bytes = self.fetch_verified(dataset, &output).await?;
        let extracted = extract_in_background(output.clone(), PathBuf::from(".")).await?;

        Ok(ProcessedDataset {
            title,
            output,
            status: DatasetStatus::Downloaded { bytes, extracted },
        })
    }

    async fn fetch_verified(
        &self,
        dataset: &Dataset,
        output: &Path,
    ) -> Result<u64, ManifetchError> {
        let bytes =
            download_to_file(self.fetcher, &dataset.url, output, &self.options.download).await?;

        let path = output.to_path_buf();
        let dataset = dataset.clone();
        tokio::task::spawn_blocking(move || verify_sha256(&path, &dataset))
            .await
            .map_err(|e| ManifetchError::Unexpected(e.into()))??;

        Ok(bytes)
    }

    async fn maybe_post_install(&self, dataset: &Dataset, title: &str) -> Result<(), ManifetchError> {
        if self.options.post_install {
            run_post_install(dataset, title).await?;
        } else if !dataset.post_install.is_empty() {
            tracing::debug!("Not running post install for {}", title);
        }
        Ok(())
    }
}
