//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject ambiguous credentials (duplicate application ids)
//! - Validate value ranges (retry ceiling > 0, parsable bind address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CourierConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::CourierConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid bind address: {0}")]
    BindAddress(String),

    #[error("Route '{0}' has an empty path")]
    EmptyRoutePath(String),

    #[error("Duplicate route name: {0}")]
    DuplicateRoute(String),

    #[error("Route '{name}' repeats {method} {path}")]
    DuplicatePattern {
        name: String,
        method: String,
        path: String,
    },

    #[error("Duplicate application id: {0}")]
    DuplicateApplication(String),

    #[error("Application '{0}' has an empty key")]
    EmptyApplicationKey(String),

    #[error("dispatch.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("dispatch.slow_down_every must be at least 1")]
    ZeroSlowDown,
}

pub fn validate_config(config: &CourierConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }

    let mut names = HashSet::new();
    let mut patterns = HashSet::new();
    for route in &config.routes {
        if route.path.is_empty() {
            errors.push(ValidationError::EmptyRoutePath(route.name.clone()));
        }
        if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        if !patterns.insert((route.method, route.path.trim_end_matches('/'))) {
            errors.push(ValidationError::DuplicatePattern {
                name: route.name.clone(),
                method: route.method.as_str().to_string(),
                path: route.path.clone(),
            });
        }
    }

    let mut ids = HashSet::new();
    for app in &config.applications {
        if !ids.insert(app.id.as_str()) {
            errors.push(ValidationError::DuplicateApplication(app.id.clone()));
        }
        if app.key.is_empty() {
            errors.push(ValidationError::EmptyApplicationKey(app.id.clone()));
        }
    }

    if config.dispatch.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if config.dispatch.slow_down_every == 0 {
        errors.push(ValidationError::ZeroSlowDown);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ApplicationConfig, RouteConfig};
    use crate::routing::RouteMethod;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CourierConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = CourierConfig::default();
        config.server.bind_address = "not-an-address".into();
        config.dispatch.max_attempts = 0;
        config.dispatch.slow_down_every = 0;
        config.routes = vec![
            RouteConfig {
                name: "a".into(),
                method: RouteMethod::Get,
                path: "".into(),
                public: false,
            },
            RouteConfig {
                name: "a".into(),
                method: RouteMethod::Post,
                path: "/a".into(),
                public: false,
            },
        ];
        config.applications = vec![ApplicationConfig {
            id: "app".into(),
            key: "".into(),
        }];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("not-an-address".into()),
                ValidationError::EmptyRoutePath("a".into()),
                ValidationError::DuplicateRoute("a".into()),
                ValidationError::EmptyApplicationKey("app".into()),
                ValidationError::ZeroAttempts,
                ValidationError::ZeroSlowDown,
            ]
        );
    }

    #[test]
    fn test_duplicate_pattern() {
        let route = |name: &str, method, path: &str| RouteConfig {
            name: name.into(),
            method,
            path: path.into(),
            public: false,
        };
        let mut config = CourierConfig::default();
        config.routes = vec![
            route("list", RouteMethod::Get, "/orders"),
            route("create", RouteMethod::Post, "/orders"),
            route("again", RouteMethod::Get, "/orders/"),
        ];

        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::DuplicatePattern {
                name: "again".into(),
                method: "GET".into(),
                path: "/orders/".into(),
            }]
        );
    }
}
