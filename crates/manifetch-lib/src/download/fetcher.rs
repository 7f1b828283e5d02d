use crate::error::ManifetchError;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use reqwest::header::CONTENT_LENGTH;

pub type ByteStream = BoxStream<'static, Result<Bytes, ManifetchError>>;

/// A response body that has not been read yet.
pub struct RemoteBody {
    pub url: String,
    /// Raw `content-length` header value, if the server sent one.
    pub content_length: Option<String>,
    pub stream: ByteStream,
}

impl RemoteBody {
    /// The announced body size. Downloads cannot be tracked without it.
    pub fn expected_length(&self) -> Result<u64, ManifetchError> {
        let value = self
            .content_length
            .as_deref()
            .ok_or_else(|| ManifetchError::MissingContentLength {
                url: self.url.clone(),
            })?;
        value
            .trim()
            .parse()
            .map_err(|_| ManifetchError::InvalidContentLength {
                url: self.url.clone(),
                value: value.to_string(),
            })
    }
}

/// Opens streaming GET requests.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RemoteBody, ManifetchError>>;
}

pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, ManifetchError> {
        let client = Client::builder()
            .user_agent(concat!("manifetch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<RemoteBody, ManifetchError> {
        tracing::debug!(url, "Sending request");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManifetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ManifetchError::from))
            .boxed();

        Ok(RemoteBody {
            url: url.to_string(),
            content_length,
            stream,
        })
    }
}
