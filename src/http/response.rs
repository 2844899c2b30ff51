//! Response construction.
//!
//! # Responsibilities
//! - Turn a pipeline outcome into the client response
//! - Map pipeline errors to status codes and short bodies
//!
//! # Design Decisions
//! - Only allow-listed headers reach the client; nothing here adds identity
//!   headers
//! - A status that cannot be represented falls back to `200`
//! - Error text is HTML-escaped before it is echoed

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::ProxyError;
use crate::proxy::html::escape_html;
use crate::proxy::pipeline::ProxyOutcome;
use crate::proxy::redirect::Redirect;

impl IntoResponse for ProxyOutcome {
    fn into_response(self) -> Response {
        match self {
            ProxyOutcome::Redirect(redirect) => redirect_response(redirect),
            ProxyOutcome::Page { status, headers, body } => {
                let mut response = Response::new(Body::from(body));
                *response.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
                *response.headers_mut() = headers;
                response
            }
        }
    }
}

fn redirect_response(redirect: Redirect) -> Response {
    let status = StatusCode::from_u16(redirect.status).unwrap_or(StatusCode::FOUND);
    match HeaderValue::from_str(&redirect.location) {
        Ok(location) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = status;
            response.headers_mut().insert(LOCATION, location);
            response
        }
        Err(_) => {
            tracing::error!("Translated redirect location is not a valid header value");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

impl IntoResponse for ProxyError {
    /// Renders without transport detail.
    fn into_response(self) -> Response {
        error_response(&self, false)
    }
}

/// Renders `err` for the client.
pub fn error_response(err: &ProxyError, expose_fetch_errors: bool) -> Response {
    let body = escape_html(&err.public_message(expose_fetch_errors)).into_owned();
    (
        err.status(),
        [
            (CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8")),
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        body,
    )
        .into_response()
}
