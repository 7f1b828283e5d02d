pub mod cli;
pub mod download;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod post_install;
pub mod processor;
pub mod progress;
pub mod runner;
pub mod utils;
pub mod verification;

pub use error::ManifetchError;
pub use manifest::{Dataset, Manifest};
pub use runner::ManifestRunner;
