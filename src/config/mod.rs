//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BootstrapConfig (validated)
//!     → ApplicationOptions / HybridOptions / global prefix for the binary
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Runtime global settings live in `app_config`, not here

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{BootstrapConfig, ListenerConfig, MicroserviceConfig, ObservabilityConfig};
