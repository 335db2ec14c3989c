//! Microservice transports.
//!
//! # Data Flow
//! ```text
//! MicroserviceClient
//!     → one JSON packet per line over TCP
//!     → tcp.rs (accept loop, per-connection reader)
//!     → handlers.rs (pattern lookup, handler call)
//!     → reply packet (requests only)
//! ```
//!
//! # Design Decisions
//! - Transports are pluggable behind the `Transport` trait
//! - Handlers live with the microservice, not the transport, so a transport
//!   can be swapped without re-registering them

pub mod client;
pub mod handlers;
pub mod packet;
pub mod tcp;
pub mod transport;

use std::sync::Arc;

pub use client::{ClientError, MicroserviceClient};
pub use handlers::{MessageHandler, MessageHandlers};
pub use packet::{ReadPacket, WritePacket};
pub use tcp::{TcpOptions, TcpTransport};
pub use transport::Transport;

/// Transport selection for `connect_microservice`.
#[derive(Clone)]
pub enum MicroserviceOptions {
    Tcp(TcpOptions),
    Custom(Arc<dyn Transport>),
}

impl MicroserviceOptions {
    pub fn into_transport(self) -> Arc<dyn Transport> {
        match self {
            MicroserviceOptions::Tcp(options) => Arc::new(TcpTransport::new(options)),
            MicroserviceOptions::Custom(transport) => transport,
        }
    }
}
