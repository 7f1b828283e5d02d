use eyre::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use manifetch_lib::download::{DownloadOptions, FetchOptions, ReqwestFetcher};
use manifetch_lib::progress::ProgressVisibility;
use manifetch_lib::{Dataset, Manifest};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Serialises tests that change the process working directory.
pub static CWD_LOCK: Mutex<()> = Mutex::const_new(());

#[derive(Clone, Debug)]
pub struct Route {
    pub body: Vec<u8>,
    pub send_content_length: bool,
}

impl Route {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            send_content_length: true,
        }
    }

    pub fn without_content_length(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            send_content_length: false,
        }
    }
}

/// Minimal HTTP/1.1 server answering GET requests from a fixed route table.
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(routes: impl IntoIterator<Item = (&'static str, Route)>) -> Result<Self> {
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, route)| (path.to_string(), route))
                .collect(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = requests.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let routes = routes.clone();
                tokio::spawn(async move {
                    if let Err(err) = serve(stream, &routes).await {
                        tracing::warn!("Test server connection failed: {}", err);
                    }
                });
            }
        });

        Ok(Self {
            addr,
            requests,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(mut stream: TcpStream, routes: &HashMap<String, Route>) -> Result<()> {
    let mut request = Vec::new();
    let mut buffer = [0u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        request.extend_from_slice(&buffer[..read]);
    }

    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    match routes.get(path) {
        Some(route) => {
            let mut head = String::from("HTTP/1.1 200 OK\r\nConnection: close\r\n");
            if route.send_content_length {
                head.push_str(&format!("Content-Length: {}\r\n", route.body.len()));
            }
            head.push_str("\r\n");
            stream.write_all(head.as_bytes()).await?;
            stream.write_all(&route.body).await?;
        }
        None => {
            stream
                .write_all(b"HTTP/1.1 404 Not Found\r\nConnection: close\r\nContent-Length: 0\r\n\r\n")
                .await?;
        }
    }
    stream.shutdown().await?;
    Ok(())
}

/// A fetcher that talks to the local test server directly.
pub fn test_fetcher() -> Result<ReqwestFetcher> {
    let client = reqwest::Client::builder().no_proxy().build()?;
    Ok(ReqwestFetcher::with_client(client))
}

pub fn test_options(archive: bool, post_install: bool) -> FetchOptions {
    FetchOptions {
        archive,
        post_install,
        download: DownloadOptions {
            progress_visibility: ProgressVisibility::Never,
            ..DownloadOptions::default()
        },
    }
}

pub fn dataset(url: String, sha256: Option<String>) -> Dataset {
    Dataset {
        sha256,
        ..Dataset::new(url)
    }
}

pub fn manifest(topics: Vec<(&str, Vec<Dataset>)>) -> Manifest {
    topics
        .into_iter()
        .map(|(topic, datasets)| (topic.to_string(), datasets))
        .collect()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn tar_bytes(files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *content)?;
    }
    Ok(builder.into_inner()?)
}

pub fn tar_gz_bytes(files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_bytes(files)?)?;
    Ok(encoder.finish()?)
}

pub fn tar_bz2_bytes(files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(&tar_bytes(files)?)?;
    Ok(encoder.finish()?)
}

/// Names of the entries directly inside `dir`, sorted.
pub fn dir_entries(dir: &std::path::Path) -> Result<Vec<String>> {
    let mut names = std::fs::read_dir(dir)?
        .map(|entry| Ok(entry?.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
