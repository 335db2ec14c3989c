//! Network binding subsystem.
//!
//! # Data Flow
//! ```text
//! Application::listen(port)
//!     → policy.rs (derive AutoListenPolicy from options)
//!     → binder.rs (attempt port, classify outcome, retry on busy port)
//!     → HttpAdapter::listen per candidate
//!     → bound SocketAddr | ListenError
//! ```
//!
//! # Design Decisions
//! - Only address-in-use is recoverable; every other bind error is final
//! - Retry budget is bounded and exhaustion is its own error
//! - Every attempt is recorded and counted in metrics

pub mod binder;
pub mod policy;

pub use binder::{AttemptOutcome, BindState, PortBindAttempt, PortBinder};
pub use policy::{AutoListen, AutoListenPolicy, AutoListenSettings, DEFAULT_MAX_PORT_ATTEMPTS};
