//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate a TOML document.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load `path` (or the defaults), apply a `bind_address` override and
/// validate the result.
///
/// Validation runs after the override so a bad CLI address is rejected
/// like a bad file entry.
pub fn resolve_config(path: Option<&Path>, bind_address: Option<String>) -> Result<ServerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ServerConfig::default(),
    };
    if let Some(bind_address) = bind_address {
        config.listener.bind_address = bind_address;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_everything() {
        let err = parse_config("[timeouts]\nrequest_secs = 0\n[limits]\nmax_body_bytes = 0\n").unwrap_err();
        let ConfigError::Validation(errors) = &err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.request_secs must be greater than zero, \
             limits.max_body_bytes must be greater than zero"
        );
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("resourceful-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[listener]\nbind_address = \"127.0.0.1:3000\"\n").unwrap();
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_bind_override_is_validated() {
        let err = resolve_config(None, Some("not-an-address".to_string())).unwrap_err();
        let ConfigError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors,
            vec![ValidationError::InvalidAddress {
                field: "listener.bind_address",
                value: "not-an-address".to_string(),
            }]
        );

        let config = resolve_config(None, Some("127.0.0.1:4000".to_string())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
    }

    #[test]
    fn test_bind_override_replaces_file_value() {
        let path = std::env::temp_dir().join(format!("resourceful-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[listener]\nbind_address = \"bogus\"\n").unwrap();
        let overridden = resolve_config(Some(&path), Some("127.0.0.1:4001".to_string()));
        let from_file = resolve_config(Some(&path), None);
        fs::remove_file(&path).unwrap();

        assert_eq!(overridden.unwrap().listener.bind_address, "127.0.0.1:4001");
        assert!(matches!(from_file.unwrap_err(), ConfigError::Validation(_)));
    }
}
