mod download;
mod fetcher;
mod types;

pub use download::{CHUNK_SIZE, download_to_file, expected_chunks};
pub use fetcher::{ByteStream, Fetcher, RemoteBody, ReqwestFetcher};
pub use types::{DownloadOptions, FetchOptions};
