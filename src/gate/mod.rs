//! Access gate: the secret entry path and its persisted record.
//!
//! # Data Flow
//! ```text
//! first visit (no record)
//!     → setup form → token.rs (normalize + validate)
//!     → store.rs (atomic create, never overwritten)
//!
//! every request
//!     → store.rs (load, cached once present)
//!     → token.rs (constant-time entry path match)
//! ```

pub mod store;
pub mod token;

use thiserror::Error;

pub use store::{FileGateStore, GateRecord, GateStore, MemoryGateStore};

/// Errors from creating or reading the gate record.
#[derive(Error, Debug)]
pub enum GateError {
    /// A record already exists; it is never replaced.
    #[error("gate is already configured")]
    AlreadyConfigured,

    /// The requested secure path does not meet the format rules.
    #[error("secure path must be 6-64 characters of a-z, 0-9 or '-'")]
    InvalidSecurePath,

    #[error("gate store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gate record is unreadable: {0}")]
    Corrupt(#[from] toml::de::Error),

    #[error("gate record could not be encoded: {0}")]
    Encode(#[from] toml::ser::Error),
}
