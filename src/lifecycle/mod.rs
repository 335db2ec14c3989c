//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (guard.rs + hooks.rs):
//!     on_module_init (each module) → adapter init → on_application_bootstrap
//!     all wrapped in a LifecycleGuard so it runs exactly once
//!
//! Shutdown (shutdown.rs):
//!     close() → stop microservices → stop HTTP serve loop → on_application_shutdown
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: modules first, then the adapter, listeners last
//! - A failed startup leaves the application re-initializable
//! - Shutdown hooks run in reverse registration order

pub mod guard;
pub mod hooks;
pub mod shutdown;
pub mod signals;

pub use guard::LifecycleGuard;
pub use hooks::{HookError, Module};
pub use shutdown::Shutdown;
