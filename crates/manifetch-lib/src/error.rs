use crate::progress::ProgressError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifetchError {
    #[error("Failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_yaml::Error),

    #[error("Failed to open manifest {path}: {reason}")]
    ManifestOpen { path: PathBuf, reason: String },

    #[error("Manifest is invalid: {details}")]
    ManifestInvalid { details: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Response from {url} has no content-length header")]
    MissingContentLength { url: String },

    #[error("Response from {url} has a non-numeric content-length header: {value:?}")]
    InvalidContentLength { url: String, value: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(
        "The declared SHA256 sum {expected:?} does not match the digest of the downloaded file {path}: {actual:?}"
    )]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Declared SHA256 sum {value:?} is not a 64 character hex string")]
    InvalidDigest { value: String },

    #[error("Failed to extract {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    #[error("Post install command {command:?} failed: {status}")]
    PostInstall { command: String, status: String },

    #[error("Progress reporting error: {0}")]
    Progress(#[from] ProgressError),

    #[error("Invalid command line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
