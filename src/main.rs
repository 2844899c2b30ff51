//! veil-proxy
//!
//! An access-gated forward proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ net/http server ──▶ gate check ──┬─▶ setup form      (not configured)
//!                      (request ID, trace,              ├─▶ decoy page      ("/")
//!                       timeout, body cap)              ├─▶ 404             (any other path)
//!                                                       └─▶ entry path
//!                                                             │
//!                                                             ▼
//!                                          validate ─▶ fetch ─▶ redirect translation
//!                                                             └▶ header policy + link rewrite
//!     Client Response
//!     ◀─────────────── allow-listed headers, rewritten body
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use veil_proxy::config::{load_or_default, override_bind};
use veil_proxy::observability::{logging, metrics};
use veil_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "veil-proxy")]
#[command(about = "Access-gated forward proxy with link rewriting", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address, e.g. 127.0.0.1:8080.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = override_bind(load_or_default(cli.config.as_deref())?, cli.bind)?;

    if cli.check {
        println!("Configuration OK");
        return Ok(());
    }

    logging::init_logging(&config.observability, cli.log_level.as_deref())?;

    tracing::info!("veil-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.upstream.timeout_secs,
        gate_store = %config.gate.store_path,
        "Configuration loaded"
    );

    if config.upstream.accept_invalid_certs {
        tracing::warn!("Upstream certificate validation is disabled");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
