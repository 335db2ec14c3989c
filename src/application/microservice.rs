//! Secondary application instance attached to a primary one.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::Value;

use crate::app_config::AppConfigHandle;
use crate::error::{InitError, ListenError};
use crate::lifecycle::LifecycleGuard;
use crate::microservice::{MessageHandlers, Transport};
use crate::observability::metrics;
use crate::observability::Logger;

const CONTEXT: &str = "Microservice";

/// A microservice with its own transport and either its own or a shared config.
pub struct MicroserviceApplication {
    transport: Arc<dyn Transport>,
    config: AppConfigHandle,
    handlers: Arc<MessageHandlers>,
    logger: Arc<dyn Logger>,
    guard: LifecycleGuard,
    init_hook_called: AtomicBool,
    eager_failure: Mutex<Option<InitError>>,
    listening: Mutex<Option<SocketAddr>>,
}

impl MicroserviceApplication {
    pub fn new(transport: Arc<dyn Transport>, config: AppConfigHandle, logger: Arc<dyn Logger>) -> Self {
        Self {
            transport,
            config,
            handlers: Arc::new(MessageHandlers::new()),
            logger,
            guard: LifecycleGuard::new("microservice"),
            init_hook_called: AtomicBool::new(false),
            eager_failure: Mutex::new(None),
            listening: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        self.transport.name()
    }

    pub fn config(&self) -> &AppConfigHandle {
        &self.config
    }

    pub fn handlers(&self) -> &MessageHandlers {
        &self.handlers
    }

    pub fn add_handler<F>(&self, pattern: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.handlers.add(pattern, handler);
    }

    pub fn is_initialized(&self) -> bool {
        self.guard.is_initialized()
    }

    /// Whether the transport's own init hook has run.
    pub fn was_init_hook_called(&self) -> bool {
        self.init_hook_called.load(Ordering::SeqCst)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.listening.lock()
    }

    /// Initialize the transport once. Later calls are no-ops.
    pub async fn init(&self) -> Result<(), InitError> {
        let result = self
            .guard
            .run(|| async {
                let started = Instant::now();
                self.transport.init().await?;
                self.init_hook_called.store(true, Ordering::SeqCst);
                metrics::record_initialization("microservice", started.elapsed());
                self.logger
                    .log(CONTEXT, &format!("Microservice `{}` initialized", self.name()));
                Ok::<_, InitError>(())
            })
            .await;

        match result {
            Ok(_) => {
                self.eager_failure.lock().take();
                Ok(())
            }
            Err(err) => {
                self.logger.error(CONTEXT, &err.to_string());
                Err(err)
            }
        }
    }

    /// Readiness of an eagerly connected microservice.
    ///
    /// Reports the failure of the initialization that ran during connection,
    /// until a later `init` succeeds. Without such a failure this initializes
    /// (a no-op when already done).
    pub async fn ready(&self) -> Result<(), InitError> {
        let failure = self.eager_failure.lock().clone();
        match failure {
            Some(err) => Err(err),
            None => self.init().await,
        }
    }

    pub(crate) fn record_eager_failure(&self, err: InitError) {
        *self.eager_failure.lock() = Some(err);
    }

    /// Initialize if needed, then start the transport.
    pub async fn listen(&self) -> Result<SocketAddr, ListenError> {
        self.init().await?;
        if let Some(addr) = self.local_addr() {
            return Ok(addr);
        }

        match self.transport.listen(Arc::clone(&self.handlers)).await {
            Ok(addr) => {
                *self.listening.lock() = Some(addr);
                self.logger.log(
                    CONTEXT,
                    &format!("Microservice `{}` listening on {addr}", self.name()),
                );
                Ok(addr)
            }
            Err(err) => {
                let err = ListenError::from(err);
                self.logger.error(CONTEXT, &err.to_string());
                Err(err)
            }
        }
    }

    pub async fn close(&self) {
        self.transport.close().await;
        self.listening.lock().take();
    }
}
