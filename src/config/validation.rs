//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject duplicate or reserved dependency names
//! - Validate value ranges (deadlines > 0, addresses parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::GatewayConfig;

/// Response field names that a dependency may not claim.
const RESERVED_NAMES: &[&str] = &["ok"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("dependency name must not be empty")]
    EmptyDependencyName,

    #[error("duplicate dependency name: {0}")]
    DuplicateDependencyName(String),

    #[error("dependency name is reserved: {0}")]
    ReservedDependencyName(String),

    #[error("dependency {0}: deadline must be greater than zero")]
    ZeroDeadline(String),

    #[error("dependency {0}: invalid endpoint: {1}")]
    InvalidEndpoint(String, String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for dep in &config.dependencies {
        if dep.name.is_empty() {
            errors.push(ValidationError::EmptyDependencyName);
        } else if RESERVED_NAMES.contains(&dep.name.as_str()) {
            errors.push(ValidationError::ReservedDependencyName(dep.name.clone()));
        } else if !seen.insert(dep.name.clone()) {
            errors.push(ValidationError::DuplicateDependencyName(dep.name.clone()));
        }

        if dep.deadline_ms == 0 {
            errors.push(ValidationError::ZeroDeadline(dep.name.clone()));
        }

        if let Err(e) = Url::parse(&dep.endpoint) {
            errors.push(ValidationError::InvalidEndpoint(
                dep.name.clone(),
                e.to_string(),
            ));
        }
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
    use crate::config::schema::{DependencyConfig, StoreKind};
    use crate::stores::DependencyErrorKind;

    fn dep(name: &str) -> DependencyConfig {
        DependencyConfig {
            name: name.to_string(),
            kind: StoreKind::KeyValue,
            endpoint: "http://127.0.0.1:9001".to_string(),
            deadline_ms: 500,
            on_exceeded: DependencyErrorKind::Timeout,
            enabled: true,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:8080".to_string();
        config.dependencies.push(dep("kv"));
        config.dependencies.push(dep("db"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:8080".to_string();
        config.dependencies.push(dep("kv"));
        config.dependencies.push(dep("kv"));
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateDependencyName("kv".to_string())]
        );
    }

    #[test]
    fn test_reserved_name_rejected() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:8080".to_string();
        config.dependencies.push(dep("ok"));
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ReservedDependencyName("ok".to_string())));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        let mut bad = dep("db");
        bad.deadline_ms = 0;
        bad.endpoint = "::nonsense::".to_string();
        config.dependencies.push(bad);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
