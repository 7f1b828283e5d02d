//! Archive unpacking keyed on the file name suffix.

use crate::error::ManifetchError;
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;
use zip::read::ZipArchive;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    TarBz2,
    Tar,
    Zip,
}

/// Most specific suffix first, so `.tar` never claims a `.tar.gz`.
const SUFFIXES: [(&str, ArchiveKind); 4] = [
    (".tar.gz", ArchiveKind::TarGz),
    (".tar.bz2", ArchiveKind::TarBz2),
    (".tar", ArchiveKind::Tar),
    (".zip", ArchiveKind::Zip),
];

impl ArchiveKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        SUFFIXES
            .iter()
            .find(|(suffix, _)| filename.ends_with(suffix))
            .map(|(_, kind)| *kind)
    }

    pub fn suffix(self) -> &'static str {
        SUFFIXES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(suffix, _)| *suffix)
            .unwrap_or_default()
    }

    /// Unpacks `archive` into `destination`.
    pub fn unpack(self, archive: &Path, destination: &Path) -> Result<(), ManifetchError> {
        let file = File::open(archive)?;
        let result = match self {
            ArchiveKind::TarGz => unpack_tar(GzDecoder::new(file), destination),
            ArchiveKind::TarBz2 => unpack_tar(BzDecoder::new(file), destination),
            ArchiveKind::Tar => unpack_tar(file, destination),
            ArchiveKind::Zip => unpack_zip(file, destination),
        };
        result.map_err(|reason| ManifetchError::Extraction {
            path: archive.to_path_buf(),
            reason,
        })
    }
}

fn unpack_tar<R: Read>(reader: R, destination: &Path) -> Result<(), String> {
    Archive::new(reader)
        .unpack(destination)
        .map_err(|e| e.to_string())
}

fn unpack_zip(file: File, destination: &Path) -> Result<(), String> {
    let mut archive = ZipArchive::new(file).map_err(|e| e.to_string())?;
    archive.extract(destination).map_err(|e| e.to_string())
}

/// Extracts `archive` into `destination` and deletes it, if its suffix names a
/// known format. Other files are left alone.
///
/// Returns the format that was extracted.
pub fn extract_and_remove(
    archive: &Path,
    destination: &Path,
) -> Result<Option<ArchiveKind>, ManifetchError> {
    let Some(kind) = archive
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(ArchiveKind::from_filename)
    else {
        tracing::debug!(path = %archive.display(), "Not an archive, leaving as is");
        return Ok(None);
    };

    tracing::info!(path = %archive.display(), format = kind.suffix(), "Extracting");
    kind.unpack(archive, destination)?;
    std::fs::remove_file(archive)?;
    Ok(Some(kind))
}

/// Runs [`extract_and_remove`] on the blocking thread pool.
pub async fn extract_in_background(
    archive: PathBuf,
    destination: PathBuf,
) -> Result<Option<ArchiveKind>, ManifetchError> {
    tokio::task::spawn_blocking(move || extract_and_remove(&archive, &destination))
        .await
        .map_err(|e| ManifetchError::Unexpected(e.into()))?
}
