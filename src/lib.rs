//! Access-gated forward proxy library.
//!
//! A single secret entry path opens a forward proxy that fetches arbitrary
//! `http`/`https` pages and rewrites their links so browsing stays on the
//! proxy. Every other path shows a stock web server page or a 404.

pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
