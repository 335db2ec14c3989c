//! Line-delimited JSON over TCP.
//!
//! # Responsibilities
//! - Validate the configured address on init
//! - Accept connections and dispatch each packet to the handler registry
//! - Stop the accept loop and every connection on close

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use super::handlers::MessageHandlers;
use super::packet::ReadPacket;
use super::transport::Transport;
use crate::error::{BindError, InitError};
use crate::lifecycle::Shutdown;

/// Address of a TCP microservice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TcpOptions {
    pub host: String,
    pub port: u16,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3100,
        }
    }
}

struct RunningTransport {
    addr: SocketAddr,
    shutdown: Shutdown,
    accept_loop: JoinHandle<()>,
}

/// TCP transport server.
pub struct TcpTransport {
    options: TcpOptions,
    running: Mutex<Option<RunningTransport>>,
}

impl TcpTransport {
    pub fn new(options: TcpOptions) -> Self {
        Self {
            options,
            running: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &TcpOptions {
        &self.options
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().as_ref().map(|r| r.addr)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn name(&self) -> &str {
        "tcp"
    }

    async fn init(&self) -> Result<(), InitError> {
        let resolved = tokio::net::lookup_host((self.options.host.as_str(), self.options.port))
            .await
            .map(|mut addrs| addrs.next().is_some());

        match resolved {
            Ok(true) => Ok(()),
            Ok(false) => Err(InitError::Transport {
                transport: self.name().to_string(),
                message: format!("host `{}` resolved to no addresses", self.options.host),
            }),
            Err(e) => Err(InitError::Transport {
                transport: self.name().to_string(),
                message: format!("cannot resolve `{}`: {e}", self.options.host),
            }),
        }
    }

    async fn listen(&self, handlers: Arc<MessageHandlers>) -> Result<SocketAddr, BindError> {
        let port = self.options.port;
        if let Some(addr) = self.local_addr() {
            return Err(BindError::other(
                port,
                io::ErrorKind::Other,
                format!("transport is already listening on {addr}"),
            ));
        }

        let listener = TcpListener::bind((self.options.host.as_str(), port))
            .await
            .map_err(|e| BindError::from_io(port, e))?;
        let addr = listener.local_addr().map_err(|e| BindError::from_io(port, e))?;

        let shutdown = Shutdown::new();
        let stop = shutdown.signalled();
        let accept_loop = tokio::spawn(accept_loop(listener, handlers, shutdown.clone(), stop));

        *self.running.lock() = Some(RunningTransport {
            addr,
            shutdown,
            accept_loop,
        });
        Ok(addr)
    }

    async fn close(&self) {
        let running = self.running.lock().take();
        let Some(running) = running else {
            return;
        };

        running.shutdown.trigger();
        if let Err(e) = running.accept_loop.await {
            tracing::error!(address = %running.addr, error = %e, "Accept loop panicked");
        }
        tracing::info!(address = %running.addr, "TCP transport stopped");
    }
}

async fn accept_loop(
    listener: TcpListener,
    handlers: Arc<MessageHandlers>,
    shutdown: Shutdown,
    stop: impl Future<Output = ()>,
) {
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::debug!(peer_addr = %peer, "Transport connection accepted");
                    let stop = shutdown.signalled();
                    tokio::spawn(serve_connection(stream, Arc::clone(&handlers), stop));
                }
                Err(e) => tracing::warn!(error = %e, "Failed to accept transport connection"),
            },
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    handlers: Arc<MessageHandlers>,
    stop: impl Future<Output = ()>,
) {
    tokio::pin!(stop);

    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = tokio::select! {
            _ = &mut stop => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Transport connection read failed");
                break;
            }
        };

        let packet: ReadPacket = match serde_json::from_str(&line) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed packet");
                continue;
            }
        };

        let Some(reply) = handlers.dispatch(packet) else {
            continue;
        };

        let mut encoded = match serde_json::to_string(&reply) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode reply");
                continue;
            }
        };
        encoded.push('\n');
        if let Err(e) = writer.write_all(encoded.as_bytes()).await {
            tracing::debug!(error = %e, "Transport connection write failed");
            break;
        }
    }
}
