//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binary
//! - Define the `Logger` capability consumed by the bootstrap core
//! - Provide the default tracing-backed logger

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sink for human-readable lifecycle events.
///
/// `context` names the component emitting the message (e.g. `"Application"`).
pub trait Logger: Send + Sync {
    fn log(&self, context: &str, message: &str);

    fn warn(&self, context: &str, message: &str) {
        self.log(context, message);
    }

    fn error(&self, context: &str, message: &str);
}

/// Logger that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn shared() -> Arc<dyn Logger> {
        Arc::new(TracingLogger)
    }
}

impl Logger for TracingLogger {
    fn log(&self, context: &str, message: &str) {
        tracing::info!(component = context, "{}", message);
    }

    fn warn(&self, context: &str, message: &str) {
        tracing::warn!(component = context, "{}", message);
    }

    fn error(&self, context: &str, message: &str) {
        tracing::error!(component = context, "{}", message);
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("app_bootstrap={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
