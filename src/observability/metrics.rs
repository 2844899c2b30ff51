//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): proxied requests by outcome
//! - `proxy_upstream_duration_seconds` (histogram): fetch latency by result
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Starts the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Counts one proxied request. `outcome` is a fixed label such as
/// `"page"`, `"redirect"`, `"invalid"` or `"upstream_error"`.
pub fn record_request(outcome: &'static str, status: u16) {
    metrics::counter!(
        "proxy_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Records how long an upstream fetch took.
pub fn record_upstream(start: Instant, success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::histogram!("proxy_upstream_duration_seconds", "result" => result)
        .record(start.elapsed().as_secs_f64());
}
