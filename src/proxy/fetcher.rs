//! Outbound fetch of the target URL.
//!
//! # Responsibilities
//! - Issue exactly one GET per inbound request with browser-like headers
//! - Surface redirects as ordinary responses (no transport following)
//! - Decompress transparently and buffer the body up to a hard limit
//!
//! # Design Decisions
//! - No connection reuse: the client keeps no idle connections
//! - Interim 1xx heads are consumed by the transport; only the final head is
//!   reported
//! - Certificate validation is a config flag, off by default
//! - No retries; every transport failure is terminal for the request

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::proxy::headers::HeaderMultimap;

/// A fully buffered upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: HeaderMultimap,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// A `200` response with no headers and no body.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderMultimap::new(),
            body: Vec::new(),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.first_str("content-type")
    }

    /// True for `text/html` content, case-insensitive.
    pub fn is_html(&self) -> bool {
        self.content_type()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false)
    }
}

impl Default for UpstreamResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised while fetching the target.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, TLS, timeout or protocol failure.
    #[error("{message}")]
    Transport { message: String },

    /// The decompressed body grew past the configured limit.
    #[error("upstream body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The HTTP client could not be constructed from the configuration.
    #[error("failed to build upstream client: {message}")]
    Client { message: String },
}

impl FetchError {
    fn transport(err: reqwest::Error) -> Self {
        FetchError::Transport {
            message: describe(&err),
        }
    }
}

/// Flattens an error and its sources into one line.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Performs the single outbound request for a validated target.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, target: &Url) -> Result<UpstreamResponse, FetchError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (USER_AGENT, &config.user_agent),
            (ACCEPT, &config.accept),
            (ACCEPT_LANGUAGE, &config.accept_language),
        ] {
            let value = HeaderValue::from_str(value).map_err(|e| FetchError::Client {
                message: format!("invalid {} value: {}", name, e),
            })?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder();
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| FetchError::Client { message: describe(&e) })?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, target: &Url) -> Result<UpstreamResponse, FetchError> {
        let mut response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = response.status().as_u16();
        let headers = HeaderMultimap::from_header_map(response.headers());

        if response
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(FetchError::BodyTooLarge {
                limit: self.max_body_bytes,
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(FetchError::transport)? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::BodyTooLarge {
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(status, body_bytes = body.len(), "Upstream response received");

        Ok(UpstreamResponse { status, headers, body })
    }
}
