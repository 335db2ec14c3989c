//! Module lifecycle hooks.

use async_trait::async_trait;

/// Error returned by a lifecycle hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// A unit of application functionality that takes part in startup and shutdown.
///
/// Hooks default to no-ops so a module only implements what it needs.
#[async_trait]
pub trait Module: Send + Sync {
    fn name(&self) -> &str;

    /// Called before the HTTP adapter initializes, in registration order.
    async fn on_module_init(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Called after the HTTP adapter initialized, in registration order.
    async fn on_application_bootstrap(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Called by `close`, in reverse registration order.
    async fn on_application_shutdown(&self) -> Result<(), HookError> {
        Ok(())
    }
}
