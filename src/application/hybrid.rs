//! Attaching microservices to a primary application.
//!
//! # Design Decisions
//! - `inherit_app_config` hands the child the parent's config instance itself
//! - Eager initialization runs inside `connect`; its failure is kept on the
//!   instance and reported by `ready()` rather than by `connect`

use std::sync::Arc;

use super::microservice::MicroserviceApplication;
use super::options::HybridOptions;
use crate::app_config::AppConfigHandle;
use crate::microservice::MicroserviceOptions;
use crate::observability::Logger;

/// Builds microservices wired to a parent's config.
pub struct HybridConnector<'a> {
    parent_config: &'a AppConfigHandle,
    logger: Arc<dyn Logger>,
}

impl<'a> HybridConnector<'a> {
    pub fn new(parent_config: &'a AppConfigHandle, logger: Arc<dyn Logger>) -> Self {
        Self {
            parent_config,
            logger,
        }
    }

    pub async fn connect(
        &self,
        options: MicroserviceOptions,
        hybrid: HybridOptions,
    ) -> Arc<MicroserviceApplication> {
        let config = if hybrid.inherit_app_config {
            self.parent_config.inherit()
        } else {
            AppConfigHandle::new()
        };

        let instance = Arc::new(MicroserviceApplication::new(
            options.into_transport(),
            config,
            Arc::clone(&self.logger),
        ));

        tracing::debug!(
            transport = instance.name(),
            inherit_app_config = hybrid.inherit_app_config,
            defer_initialization = hybrid.defer_initialization,
            "Connecting microservice"
        );

        if !hybrid.defer_initialization {
            if let Err(err) = instance.init().await {
                instance.record_eager_failure(err);
            }
        }

        instance
    }
}
