//! Proxy pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! target URL string (from the entry path)
//!     → pipeline.rs (validate: absolute, http/https only)
//!     → fetcher.rs (one GET, no redirect following, decompress, bounded body)
//!     → redirect.rs (3xx + Location → proxy redirect)   ─┐
//!     → headers.rs (allow-listed outbound headers)       │
//!     → rewriter.rs (text/html only: rewrite links)      │
//!     → ProxyOutcome ◀───────────────────────────────────┘
//! ```
//!
//! `resolver.rs` and `link.rs` are pure helpers shared by the redirect and
//! rewrite stages.

pub mod fetcher;
pub mod headers;
pub mod html;
pub mod link;
pub mod pipeline;
pub mod redirect;
pub mod resolver;
pub mod rewriter;

pub use fetcher::{Fetch, FetchError, HttpFetcher, UpstreamResponse};
pub use headers::HeaderMultimap;
pub use pipeline::{ProxyOutcome, ProxyPipeline};
