//! Transport capability of a microservice.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;

use super::handlers::MessageHandlers;
use crate::error::{BindError, InitError};

/// The server side of a microservice transport.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    /// The transport's own init hook. Runs at most once per microservice.
    async fn init(&self) -> Result<(), InitError>;

    /// Start accepting messages, dispatching them to `handlers`.
    async fn listen(&self, handlers: Arc<MessageHandlers>) -> Result<SocketAddr, BindError>;

    /// Stop accepting and release the address. Safe to call repeatedly.
    async fn close(&self);
}
