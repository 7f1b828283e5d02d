use crate::download::FetchOptions;
use crate::manifest::Manifest;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FetchParams {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    /// Directory that receives `downloads/`.
    pub output_root: PathBuf,
    pub options: FetchOptions,
}
