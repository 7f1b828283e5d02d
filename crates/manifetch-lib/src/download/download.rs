use super::fetcher::Fetcher;
use super::types::DownloadOptions;
use crate::error::ManifetchError;
use crate::progress::ProgressBar;
use bytes::BytesMut;
use eyre::WrapErr;
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use tokio::io::AsyncWriteExt;

pub const CHUNK_SIZE: usize = 1024;

/// Number of chunks a body of `total_length` bytes is tracked as, counting a
/// trailing partial chunk.
pub fn expected_chunks(total_length: u64) -> u64 {
    total_length / CHUNK_SIZE as u64 + 1
}

/// Streams `url` into `output_path` chunk by chunk, flushing after every chunk.
///
/// Returns the number of bytes written.
pub async fn download_to_file<F: Fetcher>(
    fetcher: &F,
    url: &str,
    output_path: &Path,
    options: &DownloadOptions,
) -> Result<u64, ManifetchError> {
    let mut body = fetcher.fetch(url).await?;
    let total_length = body.expected_length()?;

    let bar = ProgressBar::stderr(
        "",
        Some(expected_chunks(total_length)),
        options.progress_style.clone(),
        options.progress_visibility,
    )?;

    let file = tokio::fs::File::create(output_path)
        .await
        .wrap_err_with(|| format!("Failed to create output file: {}", output_path.display()))?;

    let mut writer = ChunkWriter {
        file,
        output_path,
        bar,
        chunks: 0,
        bytes: 0,
    };

    let mut pending = BytesMut::with_capacity(CHUNK_SIZE);
    while let Some(piece) = body.stream.next().await {
        pending.extend_from_slice(&piece?);
        while pending.len() >= CHUNK_SIZE {
            let chunk = pending.split_to(CHUNK_SIZE);
            writer.write_chunk(&chunk).await?;
        }
    }
    if !pending.is_empty() {
        writer.write_chunk(&pending).await?;
    }

    writer.finish()
}

struct ChunkWriter<'a, W: Write> {
    file: tokio::fs::File,
    output_path: &'a Path,
    bar: ProgressBar<W>,
    chunks: u64,
    bytes: u64,
}

impl<W: Write> ChunkWriter<'_, W> {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), ManifetchError> {
        self.file
            .write_all(chunk)
            .await
            .wrap_err_with(|| format!("Failed to write to {}", self.output_path.display()))?;
        self.file
            .flush()
            .await
            .wrap_err_with(|| format!("Failed to flush {}", self.output_path.display()))?;

        self.chunks += 1;
        self.bytes += chunk.len() as u64;
        self.bar.show(self.chunks, None)?;
        Ok(())
    }

    fn finish(mut self) -> Result<u64, ManifetchError> {
        self.bar.done()?;
        tracing::debug!(
            output = %self.output_path.display(),
            bytes = self.bytes,
            chunks = self.chunks,
            "Download finished"
        );
        Ok(self.bytes)
    }
}
