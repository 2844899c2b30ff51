//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, gate dispatch)
//!     → request.rs (request ID, target extraction)
//!     → [proxy pipeline fetches and rewrites]
//!     → response.rs (status, allow-listed headers, body)
//!     → Send to client
//! ```
//!
//! `pages.rs` holds the setup form, decoy page and entry form.

pub mod pages;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
