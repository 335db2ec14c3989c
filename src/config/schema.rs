//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::app_config::RouteMatcher;
use crate::application::{ApplicationOptions, HybridOptions};
use crate::microservice::{MicroserviceOptions, TcpOptions};
use crate::net::AutoListen;

/// Root configuration of the bootstrap binary.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Global prefix and its exclusions.
    pub application: ApplicationSection,

    /// HTTP listener settings.
    pub listener: ListenerConfig,

    /// Hybrid microservices attached at startup.
    pub microservices: Vec<MicroserviceConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Global route settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationSection {
    /// Prefix applied to every route (e.g. "api").
    pub global_prefix: String,

    /// Routes served without the prefix.
    pub exclude: Vec<RouteMatcher>,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// Requested port; the bound port may be higher when auto-listen retries.
    pub port: u16,

    /// `true`, `false`, or `{ enabled = .., max_attempts = .. }`.
    pub auto_listen: Option<AutoListen>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            auto_listen: None,
        }
    }
}

impl ListenerConfig {
    pub fn application_options(&self) -> ApplicationOptions {
        ApplicationOptions {
            auto_listen: self.auto_listen.clone(),
        }
    }
}

/// A TCP microservice attached to the application.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MicroserviceConfig {
    /// Identifier used in logs.
    pub name: String,

    #[serde(default = "default_microservice_host")]
    pub host: String,

    pub port: u16,

    /// Share the application's global prefix and enhancers.
    #[serde(default)]
    pub inherit_app_config: bool,

    /// Initialize when microservices start instead of when connected.
    #[serde(default)]
    pub defer_initialization: bool,
}

fn default_microservice_host() -> String {
    "127.0.0.1".to_string()
}

impl MicroserviceConfig {
    pub fn options(&self) -> MicroserviceOptions {
        MicroserviceOptions::Tcp(TcpOptions {
            host: self.host.clone(),
            port: self.port,
        })
    }

    pub fn hybrid_options(&self) -> HybridOptions {
        HybridOptions {
            inherit_app_config: self.inherit_app_config,
            defer_initialization: self.defer_initialization,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
