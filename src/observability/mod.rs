//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Application / PortBinder / microservices produce:
//!     → logging.rs (Logger capability, tracing events)
//!     → metrics.rs (bind attempts, initializations)
//!
//! Consumers:
//!     → tracing-subscriber (stdout, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Lifecycle messages go through the injectable `Logger` so callers can capture them
//! - Default logger forwards to `tracing` with the component as a field
//! - Metrics are recorded through the `metrics` facade; no-ops until an exporter is installed

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, Logger, TracingLogger};
