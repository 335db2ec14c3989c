//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Detect port collisions between the listener and microservices
//! - Validate value ranges and names
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: BootstrapConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BootstrapConfig;
use crate::net::AutoListen;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("microservice #{index} has an empty name")]
    EmptyMicroserviceName { index: usize },
    #[error("microservice name `{0}` is used more than once")]
    DuplicateMicroserviceName(String),
    #[error("port {port} is claimed by both {first} and {second}")]
    PortCollision { port: u16, first: String, second: String },
    #[error("listener.auto_listen.max_attempts must be at least 1")]
    ZeroMaxAttempts,
    #[error("global prefix `{0}` must not contain whitespace")]
    InvalidGlobalPrefix(String),
    #[error("metrics address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &BootstrapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let prefix = &config.application.global_prefix;
    if prefix.chars().any(char::is_whitespace) {
        errors.push(ValidationError::InvalidGlobalPrefix(prefix.clone()));
    }

    if let Some(AutoListen::Settings(settings)) = &config.listener.auto_listen {
        if settings.max_attempts == Some(0) {
            errors.push(ValidationError::ZeroMaxAttempts);
        }
    }

    let mut names = HashSet::new();
    let mut ports = vec![(config.listener.port, "listener".to_string())];
    for (index, microservice) in config.microservices.iter().enumerate() {
        if microservice.name.trim().is_empty() {
            errors.push(ValidationError::EmptyMicroserviceName { index });
        } else if !names.insert(microservice.name.as_str()) {
            errors.push(ValidationError::DuplicateMicroserviceName(microservice.name.clone()));
        }

        let owner = format!("microservice `{}`", microservice.name);
        // Port 0 asks the OS for any free port, so it never collides.
        if microservice.port != 0 {
            if let Some((_, first)) = ports.iter().find(|(port, _)| *port == microservice.port) {
                errors.push(ValidationError::PortCollision {
                    port: microservice.port,
                    first: first.clone(),
                    second: owner.clone(),
                });
            }
        }
        ports.push((microservice.port, owner));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
