//! Application orchestration.
//!
//! # Data Flow
//! ```text
//! caller
//!     → Application::set_global_prefix / use_global_interceptors (app_config)
//!     → Application::connect_microservice (hybrid.rs → MicroserviceApplication)
//!     → Application::init (LifecycleGuard: modules → adapter → bootstrap hooks)
//!     → Application::listen (PortBinder → HttpAdapter)
//!     → Application::close (microservices → adapter → shutdown hooks)
//! ```
//!
//! # Design Decisions
//! - `listen` initializes first, so calling `init` explicitly is optional
//! - Only one `listen` runs at a time; binds never overlap
//! - Hybrid config sharing and init timing are fixed when connecting

pub mod app;
pub mod hybrid;
pub mod microservice;
pub mod options;

pub use app::{Application, InitReport};
pub use hybrid::HybridConnector;
pub use microservice::MicroserviceApplication;
pub use options::{ApplicationOptions, HybridOptions};
