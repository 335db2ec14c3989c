//! The primary, network-facing application.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::hybrid::HybridConnector;
use super::microservice::MicroserviceApplication;
use super::options::{ApplicationOptions, HybridOptions};
use crate::adapter::HttpAdapter;
use crate::app_config::{AppConfigHandle, Enhancer, GlobalPrefixOptions};
use crate::error::{InitError, ListenError};
use crate::lifecycle::{LifecycleGuard, Module};
use crate::microservice::MicroserviceOptions;
use crate::net::PortBinder;
use crate::observability::metrics;
use crate::observability::{Logger, TracingLogger};

const CONTEXT: &str = "Application";

/// Result of the one initialization that ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    /// Number of modules whose hooks ran.
    pub modules: usize,
    pub duration: Duration,
}

/// An HTTP application, its modules and its hybrid microservices.
pub struct Application {
    adapter: Arc<dyn HttpAdapter>,
    config: AppConfigHandle,
    options: ApplicationOptions,
    logger: Arc<dyn Logger>,
    guard: LifecycleGuard<InitReport>,
    modules: RwLock<Vec<Arc<dyn Module>>>,
    microservices: RwLock<Vec<Arc<MicroserviceApplication>>>,
    /// Serializes `listen` calls and remembers the bound address.
    bound: tokio::sync::Mutex<Option<SocketAddr>>,
}

impl Application {
    pub fn new(adapter: Arc<dyn HttpAdapter>, options: ApplicationOptions) -> Self {
        Self {
            adapter,
            config: AppConfigHandle::new(),
            options,
            logger: TracingLogger::shared(),
            guard: LifecycleGuard::new("application"),
            modules: RwLock::new(Vec::new()),
            microservices: RwLock::new(Vec::new()),
            bound: tokio::sync::Mutex::new(None),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &AppConfigHandle {
        &self.config
    }

    pub fn options(&self) -> &ApplicationOptions {
        &self.options
    }

    pub fn http_adapter(&self) -> &Arc<dyn HttpAdapter> {
        &self.adapter
    }

    pub fn set_global_prefix(&self, prefix: impl Into<String>, options: GlobalPrefixOptions) -> &Self {
        self.config.set_global_prefix(prefix, options);
        self
    }

    pub fn use_global_interceptors<I>(&self, items: I) -> &Self
    where
        I: IntoIterator<Item = Arc<dyn Enhancer>>,
    {
        self.config.use_global_interceptors(items);
        self
    }

    /// Add a module. Modules registered after `init` completed take no part in startup.
    pub fn register_module(&self, module: Arc<dyn Module>) -> &Self {
        if self.guard.is_initialized() {
            self.logger.warn(
                CONTEXT,
                &format!(
                    "Module `{}` registered after initialization; its init hooks will not run",
                    module.name()
                ),
            );
        }
        self.modules.write().push(module);
        self
    }

    /// Attach a microservice. See [`HybridOptions`] for config sharing and init timing.
    pub async fn connect_microservice(
        &self,
        options: MicroserviceOptions,
        hybrid: Option<HybridOptions>,
    ) -> Arc<MicroserviceApplication> {
        let hybrid = hybrid.unwrap_or_default();
        let instance = HybridConnector::new(&self.config, Arc::clone(&self.logger))
            .connect(options, hybrid)
            .await;
        self.microservices.write().push(Arc::clone(&instance));
        instance
    }

    pub fn microservices(&self) -> Vec<Arc<MicroserviceApplication>> {
        self.microservices.read().clone()
    }

    /// Initialize and start every connected microservice, in connection order.
    pub async fn start_all_microservices(&self) -> Result<Vec<SocketAddr>, ListenError> {
        let mut addrs = Vec::new();
        for microservice in self.microservices() {
            addrs.push(microservice.listen().await?);
        }
        Ok(addrs)
    }

    pub fn is_initialized(&self) -> bool {
        self.guard.is_initialized()
    }

    /// Bring the application up. Runs once; later and concurrent calls get
    /// the same report without repeating any work.
    pub async fn init(&self) -> Result<InitReport, InitError> {
        match self.guard.run(|| self.bootstrap()).await {
            Ok(report) => Ok(*report),
            Err(err) => {
                self.logger.error(CONTEXT, &err.to_string());
                Err(err)
            }
        }
    }

    async fn bootstrap(&self) -> Result<InitReport, InitError> {
        let started = Instant::now();
        let modules = self.modules.read().clone();

        for module in &modules {
            module.on_module_init().await.map_err(|e| InitError::Module {
                module: module.name().to_string(),
                hook: "on_module_init",
                message: e.to_string(),
            })?;
        }

        self.adapter.init().await?;

        for module in &modules {
            module
                .on_application_bootstrap()
                .await
                .map_err(|e| InitError::Module {
                    module: module.name().to_string(),
                    hook: "on_application_bootstrap",
                    message: e.to_string(),
                })?;
        }

        let duration = started.elapsed();
        metrics::record_initialization("application", duration);
        self.logger.log(CONTEXT, "Application successfully started");

        Ok(InitReport {
            modules: modules.len(),
            duration,
        })
    }

    /// Listen on `port` on every interface.
    pub async fn listen(&self, port: u16) -> Result<SocketAddr, ListenError> {
        self.listen_on(port, None).await
    }

    /// Initialize if needed, then bind `port` through the port binder.
    pub async fn listen_on(&self, port: u16, host: Option<&str>) -> Result<SocketAddr, ListenError> {
        self.init().await?;

        let mut bound = self.bound.lock().await;
        if let Some(addr) = *bound {
            self.logger
                .warn(CONTEXT, &format!("Application is already listening on {addr}"));
            return Ok(addr);
        }

        let mut binder = PortBinder::new(
            self.adapter.as_ref(),
            self.logger.as_ref(),
            self.options.auto_listen_policy(),
        )
        .with_host(host);
        let addr = binder.bind(port).await?;

        *bound = Some(addr);
        self.logger
            .log(CONTEXT, &format!("Application listening on {addr}"));
        Ok(addr)
    }

    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.bound.lock().await
    }

    /// Stop microservices and the HTTP server, then run shutdown hooks.
    pub async fn close(&self) {
        for microservice in self.microservices() {
            microservice.close().await;
        }

        self.adapter.close().await;
        self.bound.lock().await.take();

        if self.guard.is_initialized() {
            let modules = self.modules.read().clone();
            for module in modules.iter().rev() {
                if let Err(e) = module.on_application_shutdown().await {
                    self.logger.error(
                        CONTEXT,
                        &format!("Module `{}` failed during shutdown: {e}", module.name()),
                    );
                }
            }
        }

        self.logger.log(CONTEXT, "Application closed");
    }
}
