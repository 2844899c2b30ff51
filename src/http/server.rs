//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the setup, decoy and entry handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind the router to a plain or TLS listener
//! - Dispatch entry-path requests to the proxy pipeline

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer, map_response_body::MapResponseBodyLayer, request_id::SetRequestIdLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::gate::token::matches_entry_path;
use crate::gate::{FileGateStore, GateError, GateStore};
use crate::http::pages;
use crate::http::request::{extract_target, form_field, request_id, UuidRequestId, SETUP_FIELD, X_REQUEST_ID};
use crate::http::response::error_response;
use crate::lifecycle::shutdown_signal;
use crate::net::tls::load_tls_config;
use crate::observability::metrics;
use crate::proxy::{FetchError, HttpFetcher, ProxyOutcome, ProxyPipeline};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub gate: Arc<dyn GateStore>,
    pub pipeline: ProxyPipeline,
}

/// HTTP server for the gated proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a server backed by the on-disk gate record and a live fetcher.
    pub fn new(config: ProxyConfig) -> Result<Self, FetchError> {
        let gate = Arc::new(FileGateStore::new(&config.gate.store_path));
        let fetcher = Arc::new(HttpFetcher::new(&config.upstream)?);
        Ok(Self::with_parts(config, gate, ProxyPipeline::new(fetcher)))
    }

    /// Create a server with a caller-supplied gate store.
    pub fn with_gate(config: ProxyConfig, gate: Arc<dyn GateStore>) -> Result<Self, FetchError> {
        let fetcher = Arc::new(HttpFetcher::new(&config.upstream)?);
        Ok(Self::with_parts(config, gate, ProxyPipeline::new(fetcher)))
    }

    /// Create a server from already-built parts.
    pub fn with_parts(config: ProxyConfig, gate: Arc<dyn GateStore>, pipeline: ProxyPipeline) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            gate,
            pipeline,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request),
                    method = %request.method(),
                )
            }))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(MapResponseBodyLayer::new(Body::new))
            .layer(RequestBodyLimitLayer::new(config.security.max_form_bytes));

        Router::new()
            .route("/", any(root_handler))
            .fallback(entry_handler)
            .with_state(state)
            .layer(middleware)
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires or Ctrl+C is received.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;

        match &self.config.listener.tls {
            None => {
                tracing::info!(address = %addr, "HTTP server starting");
                axum::serve(listener, self.router.into_make_service())
                    .with_graceful_shutdown(shutdown_signal(shutdown))
                    .await?;
            }
            Some(tls) => {
                let rustls = load_tls_config(tls).await?;
                tracing::info!(address = %addr, "HTTPS server starting");

                let handle = axum_server::Handle::new();
                let signal_handle = handle.clone();
                let grace = Duration::from_secs(self.config.timeouts.request_secs);
                tokio::spawn(async move {
                    shutdown_signal(shutdown).await;
                    signal_handle.graceful_shutdown(Some(grace));
                });

                axum_server::from_tcp_rustls(listener.into_std()?, rustls)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// `/`: setup form before setup, decoy page afterwards.
async fn root_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.gate.load() {
        Ok(Some(_)) => pages::decoy_page(),
        Ok(None) => setup(&state, request).await,
        Err(e) => gate_unavailable(e),
    }
}

/// Every other path: setup before setup, then the entry path or 404.
async fn entry_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let record = match state.gate.load() {
        Ok(Some(record)) => record,
        Ok(None) => return setup(&state, request).await,
        Err(e) => return gate_unavailable(e),
    };

    let entry_path = record.entry_path();
    if !matches_entry_path(request.uri().path(), &entry_path) {
        return pages::not_found();
    }

    let (parts, body) = request.into_parts();
    let body = match read_form(body, state.config.security.max_form_bytes).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    let Some(target) = extract_target(&parts.method, parts.uri.query(), &body) else {
        return pages::entry_form();
    };

    match state.pipeline.handle(&target, &entry_path).await {
        Ok(outcome) => {
            let (label, status) = match &outcome {
                ProxyOutcome::Redirect(redirect) => ("redirect", redirect.status),
                ProxyOutcome::Page { status, .. } => ("page", *status),
            };
            metrics::record_request(label, status);
            outcome.into_response()
        }
        Err(err) => {
            let label = match &err {
                ProxyError::Fetch(_) => "upstream_error",
                _ => "invalid",
            };
            metrics::record_request(label, err.status().as_u16());
            error_response(&err, state.config.security.expose_fetch_errors)
        }
    }
}

/// First-time setup: show the form, or create the gate record from it.
async fn setup(state: &AppState, request: Request<Body>) -> Response {
    if request.method() != Method::POST {
        return pages::setup_form();
    }

    let body = match read_form(request.into_body(), state.config.security.max_form_bytes).await {
        Ok(body) => body,
        Err(response) => return response,
    };
    let Some(secure_path) = form_field(&body, SETUP_FIELD) else {
        return pages::setup_form();
    };

    match state.gate.create(&secure_path) {
        Ok(_) => {
            tracing::info!("Gate configured");
            redirect_home()
        }
        Err(GateError::AlreadyConfigured) => redirect_home(),
        Err(GateError::InvalidSecurePath) => (
            StatusCode::BAD_REQUEST,
            "Invalid secure path: use 6 to 64 letters, digits or dashes",
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save gate record");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save, check write permissions",
            )
                .into_response()
        }
    }
}

async fn read_form(body: Body, limit: usize) -> Result<Bytes, Response> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        StatusCode::PAYLOAD_TOO_LARGE.into_response()
    })
}

fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

fn gate_unavailable(err: GateError) -> Response {
    tracing::error!(error = %err, "Failed to read gate record");
    ProxyError::from(err).into_response()
}
