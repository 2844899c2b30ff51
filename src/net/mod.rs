//! Network layer subsystem.
//!
//! Plain TCP is served by `axum::serve`; when the listener has a certificate
//! configured, connections are terminated with rustls via `axum-server`.

pub mod tls;
