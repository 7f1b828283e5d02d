use crate::error::ManifetchError;
use crate::manifest::Dataset;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

const SHA256_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Verification failed: expected {}, got {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    VerificationFailed { expected: Vec<u8>, actual: Vec<u8> },
}

pub struct ContentDigestVerifier {
    hasher: Sha256,
    expected_digest: Vec<u8>,
}

impl ContentDigestVerifier {
    /// Parses a declared hex digest. Surrounding whitespace and letter case are ignored.
    pub fn from_hex_digest(declared: &str) -> Result<Self, ManifetchError> {
        let normalized = declared.trim().to_ascii_lowercase();
        let expected_digest = hex::decode(&normalized)
            .ok()
            .filter(|bytes| bytes.len() == SHA256_LEN)
            .ok_or_else(|| ManifetchError::InvalidDigest {
                value: declared.to_string(),
            })?;
        Ok(Self {
            hasher: Sha256::new(),
            expected_digest,
        })
    }

    #[inline]
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        Digest::update(&mut self.hasher, data.as_ref());
    }

    pub fn verify(self) -> Result<(), VerificationError> {
        let actual_digest = self.hasher.finalize().to_vec();

        if actual_digest == self.expected_digest {
            Ok(())
        } else {
            Err(VerificationError::VerificationFailed {
                expected: self.expected_digest,
                actual: actual_digest,
            })
        }
    }
}

fn feed_file(path: &Path, mut sink: impl FnMut(&[u8])) -> std::io::Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buffer = vec![0u8; 65536];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        sink(&buffer[..bytes_read]);
    }
    Ok(())
}

/// Checks the file against the dataset's declared SHA-256, if any.
///
/// Datasets without a declared digest are trusted as downloaded.
pub fn verify_sha256(path: &Path, dataset: &Dataset) -> Result<(), ManifetchError> {
    let Some(declared) = dataset.sha256.as_deref() else {
        tracing::debug!(path = %path.display(), "No SHA256 sum declared, skipping verification");
        return Ok(());
    };

    let mut verifier = ContentDigestVerifier::from_hex_digest(declared)?;
    feed_file(path, |chunk| verifier.update(chunk))?;

    match verifier.verify() {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "SHA256 sum matches");
            Ok(())
        }
        Err(VerificationError::VerificationFailed { actual, .. }) => {
            let actual = hex::encode(actual);
            tracing::error!(
                path = %path.display(),
                expected = declared,
                actual = %actual,
                "The declared SHA256 sum does not match the digest of the downloaded file"
            );
            Err(ManifetchError::ChecksumMismatch {
                path: path.to_path_buf(),
                expected: declared.to_string(),
                actual,
            })
        }
    }
}
