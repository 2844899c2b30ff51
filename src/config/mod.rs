//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc with every handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no process-wide singleton
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, override_bind, ConfigError};
pub use schema::{
    GateConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, SecurityConfig, TimeoutConfig,
    TlsConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
