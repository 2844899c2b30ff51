//! The proxy pipeline: validate, fetch, then translate or transform.

use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderMap;
use url::Url;

use crate::error::{ProxyError, Result};
use crate::observability::metrics;
use crate::proxy::fetcher::Fetch;
use crate::proxy::headers::outbound_headers;
use crate::proxy::redirect::{self, Redirect};
use crate::proxy::rewriter::rewrite;

/// What the pipeline produced for one request.
#[derive(Debug)]
pub enum ProxyOutcome {
    /// Upstream redirected; send the client back through the entry path.
    Redirect(Redirect),
    /// Upstream content, with policy headers and a possibly rewritten body.
    Page {
        status: u16,
        headers: HeaderMap,
        body: Vec<u8>,
    },
}

/// Checks that `raw` is an absolute `http`/`https` URL.
///
/// Surrounding whitespace is ignored.
pub fn validate_target(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| ProxyError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ProxyError::UnsupportedScheme {
                scheme: other.to_string(),
            })
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ProxyError::InvalidUrl);
    }
    Ok(url)
}

/// Runs one target through fetch and transformation.
#[derive(Clone)]
pub struct ProxyPipeline {
    fetcher: Arc<dyn Fetch>,
}

impl ProxyPipeline {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    /// Proxies `target` for a client using `entry_path`.
    ///
    /// Nothing is fetched unless the target validates. Relative links and
    /// redirect locations resolve against the target as given.
    pub async fn handle(&self, target: &str, entry_path: &str) -> Result<ProxyOutcome> {
        let url = validate_target(target)?;
        let base = target.trim();

        tracing::debug!(target = %url, "Fetching upstream");

        let start = Instant::now();
        let fetched = self.fetcher.fetch(&url).await;
        metrics::record_upstream(start, fetched.is_ok());

        let upstream = fetched.inspect_err(|e| {
            tracing::warn!(error = %e, host = url.host_str().unwrap_or(""), "Upstream fetch failed");
        })?;

        if let Some(redirect) = redirect::translate(&upstream, base, entry_path) {
            return Ok(ProxyOutcome::Redirect(redirect));
        }

        let headers = outbound_headers(&upstream.headers);
        let body = if upstream.is_html() {
            rewrite(&upstream.body, base, entry_path)
        } else {
            upstream.body
        };

        Ok(ProxyOutcome::Page {
            status: upstream.status,
            headers,
            body,
        })
    }
}
