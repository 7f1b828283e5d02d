use crate::error::ManifetchError;
use std::path::{Path, PathBuf};
use url::Url;

/// Changes the process working directory for as long as the guard lives.
///
/// The previous directory is restored on drop, including during unwinding.
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
pub struct DirectoryContext {
    old_dir: PathBuf,
}

impl DirectoryContext {
    pub fn enter(new_dir: impl AsRef<Path>) -> Result<Self, ManifetchError> {
        let old_dir = std::env::current_dir()?;
        std::env::set_current_dir(new_dir.as_ref())?;
        tracing::trace!(from = %old_dir.display(), to = %new_dir.as_ref().display(), "Entered directory");
        Ok(Self { old_dir })
    }
}

impl Drop for DirectoryContext {
    fn drop(&mut self) {
        if let Err(err) = std::env::set_current_dir(&self.old_dir) {
            tracing::error!(
                dir = %self.old_dir.display(),
                "Failed to restore working directory: {}",
                err
            );
        }
    }
}

/// Last segment of the URL path, without query or fragment.
pub fn filename_from_url(url: &str) -> Result<String, ManifetchError> {
    let parsed = Url::parse(url).map_err(|e| ManifetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ManifetchError::InvalidUrl {
            url: url.to_string(),
            reason: "no filename in path".to_string(),
        })
}

#[cfg(test)]
pub(crate) static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
