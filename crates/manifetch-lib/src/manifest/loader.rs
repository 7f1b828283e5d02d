use super::Manifest;
use crate::error::ManifetchError;
use std::io::BufReader;
use std::path::Path;

/// Reads a YAML manifest. Topic keys are taken verbatim, dots and case included.
pub fn load_manifest(manifest_path: &Path) -> Result<Manifest, ManifetchError> {
    let file = std::fs::File::open(manifest_path).map_err(|e| ManifetchError::ManifestOpen {
        path: manifest_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let manifest: Manifest = serde_yaml::from_reader(BufReader::new(file))?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

fn validate_manifest(manifest: &Manifest) -> Result<(), ManifetchError> {
    for (topic, datasets) in manifest.iter() {
        if topic.is_empty() {
            return Err(ManifetchError::ManifestInvalid {
                details: "Topic names must not be empty".to_string(),
            });
        }
        if let Some(position) = datasets.iter().position(|d| d.url.trim().is_empty()) {
            return Err(ManifetchError::ManifestInvalid {
                details: format!("Dataset #{} of topic {topic:?} has an empty url", position + 1),
            });
        }
    }
    Ok(())
}
