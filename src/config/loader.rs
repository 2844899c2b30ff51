//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProxyConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Loads `path` if given, otherwise validates and returns the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = ProxyConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Applies a listen address override and validates the result again.
pub fn override_bind(mut config: ProxyConfig, bind: Option<String>) -> Result<ProxyConfig, ConfigError> {
    if let Some(bind) = bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_partial_config_over_defaults() {
        let file = create_temp_config(
            r#"
[listener]
bind_address = "127.0.0.1:9000"

[upstream]
accept_invalid_certs = false
max_body_bytes = 1048576

[observability]
log_level = "debug"
log_format = "json"
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert!(!config.upstream.accept_invalid_certs);
        assert_eq!(config.upstream.max_body_bytes, 1024 * 1024);
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(config.security.expose_fetch_errors);
    }

    #[test]
    fn empty_file_is_default() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();
        assert!(config.upstream.accept_invalid_certs);
        assert_eq!(config.gate.store_path, ".veil_gate.toml");
    }

    #[test]
    fn parse_and_validation_errors() {
        let file = create_temp_config("[listener\n");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));

        let file = create_temp_config("[observability]\nlog_level = \"chatty\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("chatty"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/veil.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn bind_override_is_validated() {
        let config = override_bind(ProxyConfig::default(), Some("127.0.0.1:9100".into())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9100");

        let err = override_bind(ProxyConfig::default(), Some("garbage".into())).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("garbage"));

        let config = override_bind(ProxyConfig::default(), None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn no_path_means_defaults() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
