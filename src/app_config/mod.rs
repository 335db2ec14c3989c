//! Application-wide settings.
//!
//! # Data Flow
//! ```text
//! caller
//!     → set_global_prefix / use_global_* (AppConfigHandle)
//!     → ApplicationConfig (single instance behind Arc<RwLock>)
//!     → read by the application, its adapter, and any hybrid
//!       microservice that inherited the same handle
//! ```
//!
//! # Design Decisions
//! - Sharing is an explicit ownership flag chosen at connection time
//! - An inherited handle points at the parent's instance; there is no copy to resync
//! - Locks are short and never held across an `.await`

pub mod enhancer;
pub mod route;

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

pub use enhancer::{Enhancer, EnhancerKind, GlobalEnhancer};
pub use route::{normalize_path, ExcludeRoute, RequestMethod, RouteMatcher};

/// Options accepted by `set_global_prefix`.
#[derive(Debug, Clone, Default)]
pub struct GlobalPrefixOptions {
    pub exclude: Vec<RouteMatcher>,
}

impl GlobalPrefixOptions {
    pub fn exclude<I, M>(routes: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<RouteMatcher>,
    {
        Self {
            exclude: routes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Stored global prefix options, exclusions already normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedPrefixOptions {
    pub exclude: Vec<ExcludeRoute>,
}

/// The settings themselves. Plain data; see [`AppConfigHandle`] for sharing.
#[derive(Debug, Default)]
pub struct ApplicationConfig {
    global_prefix: String,
    global_prefix_options: NormalizedPrefixOptions,
    global_enhancers: Vec<GlobalEnhancer>,
}

impl ApplicationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_global_prefix(&mut self, prefix: impl Into<String>, options: GlobalPrefixOptions) {
        self.global_prefix = prefix.into();
        self.global_prefix_options = NormalizedPrefixOptions {
            exclude: options.exclude.iter().map(ExcludeRoute::normalize).collect(),
        };
    }

    pub fn global_prefix(&self) -> &str {
        &self.global_prefix
    }

    pub fn global_prefix_options(&self) -> &NormalizedPrefixOptions {
        &self.global_prefix_options
    }

    pub fn add_global_enhancers<I>(&mut self, kind: EnhancerKind, items: I)
    where
        I: IntoIterator<Item = Arc<dyn Enhancer>>,
    {
        self.global_enhancers
            .extend(items.into_iter().map(|instance| GlobalEnhancer { kind, instance }));
    }

    /// Enhancers of one kind, in registration order.
    pub fn global_enhancers(&self, kind: EnhancerKind) -> Vec<Arc<dyn Enhancer>> {
        self.global_enhancers
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| Arc::clone(&e.instance))
            .collect()
    }

    /// Every enhancer regardless of kind, in registration order.
    pub fn all_global_enhancers(&self) -> &[GlobalEnhancer] {
        &self.global_enhancers
    }

    /// Whether `path` is excluded from the global prefix.
    pub fn is_excluded(&self, path: &str, method: RequestMethod) -> bool {
        self.global_prefix_options
            .exclude
            .iter()
            .any(|route| route.matches(path, method))
    }

    /// Externally visible path of a route once the global prefix applies.
    pub fn route_path(&self, path: &str, method: RequestMethod) -> String {
        if self.global_prefix.trim().is_empty() || self.is_excluded(path, method) {
            return normalize_path(path);
        }
        normalize_path(&format!("{}/{}", self.global_prefix, path))
    }
}

/// Whether a handle owns its config or borrows the parent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOwnership {
    Owned,
    Inherited,
}

/// Handle through which an application reads and mutates its config.
#[derive(Debug, Clone)]
pub struct AppConfigHandle {
    inner: Arc<RwLock<ApplicationConfig>>,
    ownership: ConfigOwnership,
}

impl AppConfigHandle {
    /// A fresh, independently owned config.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ApplicationConfig::new())),
            ownership: ConfigOwnership::Owned,
        }
    }

    /// A handle onto the very same config as `self`.
    pub fn inherit(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ownership: ConfigOwnership::Inherited,
        }
    }

    pub fn ownership(&self) -> ConfigOwnership {
        self.ownership
    }

    /// True when both handles point at one config instance.
    pub fn is_shared_with(&self, other: &AppConfigHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn set_global_prefix(&self, prefix: impl Into<String>, options: GlobalPrefixOptions) {
        self.inner.write().set_global_prefix(prefix, options);
    }

    pub fn global_prefix(&self) -> String {
        self.inner.read().global_prefix().to_string()
    }

    pub fn global_prefix_options(&self) -> NormalizedPrefixOptions {
        self.inner.read().global_prefix_options().clone()
    }

    pub fn use_global_interceptors<I>(&self, items: I)
    where
        I: IntoIterator<Item = Arc<dyn Enhancer>>,
    {
        self.inner.write().add_global_enhancers(EnhancerKind::Interceptor, items);
    }

    pub fn use_global_pipes<I>(&self, items: I)
    where
        I: IntoIterator<Item = Arc<dyn Enhancer>>,
    {
        self.inner.write().add_global_enhancers(EnhancerKind::Pipe, items);
    }

    pub fn use_global_guards<I>(&self, items: I)
    where
        I: IntoIterator<Item = Arc<dyn Enhancer>>,
    {
        self.inner.write().add_global_enhancers(EnhancerKind::Guard, items);
    }

    pub fn use_global_filters<I>(&self, items: I)
    where
        I: IntoIterator<Item = Arc<dyn Enhancer>>,
    {
        self.inner.write().add_global_enhancers(EnhancerKind::Filter, items);
    }

    pub fn global_interceptors(&self) -> Vec<Arc<dyn Enhancer>> {
        self.inner.read().global_enhancers(EnhancerKind::Interceptor)
    }

    pub fn global_pipes(&self) -> Vec<Arc<dyn Enhancer>> {
        self.inner.read().global_enhancers(EnhancerKind::Pipe)
    }

    pub fn global_guards(&self) -> Vec<Arc<dyn Enhancer>> {
        self.inner.read().global_enhancers(EnhancerKind::Guard)
    }

    pub fn global_filters(&self) -> Vec<Arc<dyn Enhancer>> {
        self.inner.read().global_enhancers(EnhancerKind::Filter)
    }

    pub fn route_path(&self, path: &str, method: RequestMethod) -> String {
        self.inner.read().route_path(path, method)
    }

    /// Run `f` against the config under a read lock.
    pub fn read<R>(&self, f: impl FnOnce(&ApplicationConfig) -> R) -> R {
        f(&self.inner.read())
    }
}

impl Default for AppConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}
