//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::CourierConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<CourierConfig, ConfigError> {
    let config: CourierConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CourierConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use crate::routing::RouteMethod;

    const SAMPLE: &str = r#"
        [server]
        bind_address = "127.0.0.1:9000"

        [dispatch]
        base_delay_ms = 500
        max_attempts = 5

        [observability]
        log_format = "json"

        [[routes]]
        name = "health"
        method = "GET"
        path = "/health"
        public = true

        [[routes]]
        name = "orders"
        method = "POST"
        path = "/orders/:id"

        [[applications]]
        id = "billing"
        key = "s3cret"
    "#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.dispatch.base_delay_ms, 500);
        assert_eq!(config.dispatch.max_attempts, 5);
        assert_eq!(config.dispatch.slow_down_every, 10);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.routes.len(), 2);
        assert!(config.routes[0].public);
        assert!(!config.routes[1].public);
        assert_eq!(config.routes[1].method, RouteMethod::Post);
        assert_eq!(config.applications[0].id, "billing");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.dispatch.max_attempts, 100);
        assert_eq!(config.dispatch.base_delay_ms, 30_000);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_unknown_method_is_parse_error() {
        let err = parse_config(
            r#"
            [[routes]]
            name = "x"
            method = "TRACE"
            path = "/x"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = parse_config(
            r#"
            [[applications]]
            id = "a"
            key = "1"

            [[applications]]
            id = "a"
            key = "2"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("Duplicate application id"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
