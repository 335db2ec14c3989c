//! HTTP adapter capability.
//!
//! # Data Flow
//! ```text
//! Application::init
//!     → HttpAdapter::init (install layers, prepare server)
//! PortBinder
//!     → HttpAdapter::listen(port, host)  (one call per candidate port)
//!     → Ok(bound address) | Err(BindError classified by kind)
//! Application::close
//!     → HttpAdapter::close (stop serving, release the port)
//! ```
//!
//! # Design Decisions
//! - Adapters report bind failures as `BindError` so address-in-use is machine-checkable
//! - A failed `listen` must leave the adapter able to try another port

pub mod axum;

use std::net::SocketAddr;

use async_trait::async_trait;

use crate::error::{BindError, InitError};

pub use self::axum::AxumAdapter;

/// Host used when the caller does not name one.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// The network server an application drives.
#[async_trait]
pub trait HttpAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Adapter-level initialization. Called at most once per application.
    async fn init(&self) -> Result<(), InitError>;

    /// Bind `host:port` and start serving.
    async fn listen(&self, port: u16, host: Option<&str>) -> Result<SocketAddr, BindError>;

    /// Stop serving and release the bound port. Safe to call repeatedly.
    async fn close(&self);
}
