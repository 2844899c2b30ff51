//! Error types shared by the request pipeline.
//!
//! Each error maps to exactly one client-facing status. None of them are
//! retried, and none outlive the request that produced them.

use axum::http::StatusCode;
use thiserror::Error;

use crate::gate::GateError;
use crate::proxy::fetcher::FetchError;

/// Errors that terminate a proxied request.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The target is not a syntactically valid absolute URL.
    #[error("invalid target URL")]
    InvalidUrl,

    /// The target parsed, but its scheme is neither `http` nor `https`.
    #[error("unsupported scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    /// The outbound fetch failed at the transport layer.
    #[error("upstream fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The gate record could not be read or written.
    #[error("gate store error: {0}")]
    Gate(#[from] GateError),
}

impl ProxyError {
    /// Status code returned to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidUrl | ProxyError::UnsupportedScheme { .. } => StatusCode::BAD_REQUEST,
            ProxyError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Gate(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short human-readable body. Transport detail is included only when
    /// `expose_fetch_errors` is set.
    pub fn public_message(&self, expose_fetch_errors: bool) -> String {
        match self {
            ProxyError::InvalidUrl => "Error: the URL is not valid".to_string(),
            ProxyError::UnsupportedScheme { .. } => "Error: only http and https are supported".to_string(),
            ProxyError::Fetch(e) if expose_fetch_errors => format!("Proxy error: {}", e),
            ProxyError::Fetch(_) => "Proxy error: the upstream server could not be reached".to_string(),
            ProxyError::Gate(_) => "Internal error".to_string(),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ProxyError>;
