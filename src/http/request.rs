//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID for log correlation
//! - Extract the target URL from the query (`GET`) or form body (`POST`)
//! - Read form fields for the setup form
//!
//! # Design Decisions
//! - Request ID is added as early as possible and never echoed to clients
//! - Only `GET ?u=` and `POST url=` carry a target; anything else shows the
//!   entry form

use axum::http::{HeaderName, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::proxy::link::TARGET_PARAM;

/// Header carrying the per-request ID inside the service stack.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Form field carrying the target on the initial submission.
pub const FORM_TARGET_FIELD: &str = "url";

/// Form field carrying the requested secure path during setup.
pub const SETUP_FIELD: &str = "secure_path";

/// Makes UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Reads the request ID set by [`UuidRequestId`].
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// First value of `name` in an `application/x-www-form-urlencoded` payload.
pub fn form_field(encoded: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// The target URL a request asks for, if any.
pub fn extract_target(method: &Method, query: Option<&str>, body: &[u8]) -> Option<String> {
    match *method {
        Method::GET => query.and_then(|q| form_field(q.as_bytes(), TARGET_PARAM)),
        Method::POST => form_field(body, FORM_TARGET_FIELD),
        _ => None,
    }
}
