//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check addresses and header values are usable before startup
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("listener.tls paths must not be empty")]
    TlsPaths,

    #[error("upstream.{0} must be greater than zero")]
    Zero(&'static str),

    #[error("upstream.{0} is not a valid header value")]
    HeaderValue(&'static str),

    #[error("timeouts.request_secs ({request}) must not be shorter than upstream.timeout_secs ({upstream})")]
    RequestTimeout { request: u64, upstream: u64 },

    #[error("gate.store_path must not be empty")]
    GatePath,

    #[error("security.max_form_bytes must be greater than zero")]
    FormLimit,

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Checks `config`, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::TlsPaths);
        }
    }

    let upstream = &config.upstream;
    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::Zero("timeout_secs"));
    }
    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("connect_timeout_secs"));
    }
    if upstream.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("max_body_bytes"));
    }
    for (field, value) in [
        ("user_agent", &upstream.user_agent),
        ("accept", &upstream.accept),
        ("accept_language", &upstream.accept_language),
    ] {
        if value.is_empty() || HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::HeaderValue(field));
        }
    }

    if config.timeouts.request_secs < upstream.timeout_secs {
        errors.push(ValidationError::RequestTimeout {
            request: config.timeouts.request_secs,
            upstream: upstream.timeout_secs,
        });
    }

    if config.gate.store_path.trim().is_empty() {
        errors.push(ValidationError::GatePath);
    }
    if config.security.max_form_bytes == 0 {
        errors.push(ValidationError::FormLimit);
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
