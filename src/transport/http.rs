use std::ops::Range;

use bytes::Bytes;
use reqwest::header::{CONTENT_RANGE, HeaderValue, RANGE};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::trace;

use super::{BodyStream, Transport, collect};
use crate::config::EngineConfig;
use crate::error::{ConfigError, TransportError};

/// HTTP(S) transport issuing `Range` requests through a shared reqwest client.
///
/// Servers that ignore `Range` answer `200` with the whole body; the leading
/// bytes before the requested offset are then skipped locally.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    multiplexing: bool,
}

impl HttpTransport {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            client,
            multiplexing: !config.force_sequential,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            multiplexing: true,
        }
    }

    async fn request(&self, target: &str, range: Range<usize>) -> Result<HttpBody, TransportError> {
        let url = parse_target(target)?;
        let header = format!("bytes={}-{}", range.start, range.end.saturating_sub(1));

        let response = self
            .client
            .get(url)
            .header(RANGE, header)
            .send()
            .await?;

        let status = response.status();
        trace!(url = target, %status, "response headers received");

        let skip = match status {
            StatusCode::PARTIAL_CONTENT => {
                match response.headers().get(CONTENT_RANGE).and_then(content_range_start) {
                    Some(start) if start <= range.start => range.start - start,
                    Some(_) => return Err(TransportError::Status(status.as_u16())),
                    None => 0,
                }
            }
            StatusCode::RANGE_NOT_SATISFIABLE => return Ok(HttpBody::empty()),
            s if s.is_success() => range.start,
            s => return Err(TransportError::Status(s.as_u16())),
        };

        Ok(HttpBody {
            response: Some(response),
            skip,
        })
    }
}

impl Transport for HttpTransport {
    type Body = HttpBody;

    async fn open(&self, target: &str, limit: usize) -> Result<HttpBody, TransportError> {
        self.request(target, 0..limit.max(1)).await
    }

    async fn read_range(&self, target: &str, range: Range<usize>) -> Result<Bytes, TransportError> {
        if range.is_empty() {
            return Ok(Bytes::new());
        }
        let len = range.len();
        let mut body = self.request(target, range).await?;
        collect(&mut body, 0, len).await
    }

    fn supports_multiplexing(&self) -> bool {
        self.multiplexing
    }
}

/// Response body with any unrequested leading bytes stripped.
#[derive(Debug)]
pub struct HttpBody {
    response: Option<Response>,
    skip: usize,
}

impl HttpBody {
    fn empty() -> Self {
        Self {
            response: None,
            skip: 0,
        }
    }
}

impl BodyStream for HttpBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        loop {
            let Some(response) = self.response.as_mut() else {
                return Ok(None);
            };
            let Some(chunk) = response.chunk().await? else {
                self.response = None;
                return Ok(None);
            };
            if self.skip >= chunk.len() {
                self.skip -= chunk.len();
                continue;
            }
            let chunk = chunk.slice(self.skip..);
            self.skip = 0;
            return Ok(Some(chunk));
        }
    }
}

fn parse_target(target: &str) -> Result<Url, TransportError> {
    let url = Url::parse(target)
        .map_err(|e| TransportError::InvalidTarget(format!("{target}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(TransportError::UnsupportedScheme {
            scheme: scheme.to_string(),
            target: target.to_string(),
        }),
    }
}

/// First byte position of `Content-Range: bytes a-b/total`.
fn content_range_start(value: &HeaderValue) -> Option<usize> {
    let text = value.to_str().ok()?.trim();
    let spec = text.strip_prefix("bytes")?.trim_start();
    let (start, _) = spec.split_once('-')?;
    start.trim().parse().ok()
}
