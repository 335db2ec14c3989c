//! Client for the TCP transport.

use std::io;
use std::net::SocketAddr;

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use uuid::Uuid;

use super::packet::{ReadPacket, WritePacket};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed packet: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("remote handler failed: {0}")]
    Remote(String),
    #[error("connection closed before a reply arrived")]
    Closed,
}

/// A single connection to a TCP microservice.
pub struct MicroserviceClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl MicroserviceClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            writer,
        })
    }

    /// Send a request and wait for its reply.
    pub async fn send(&mut self, pattern: &str, data: Value) -> Result<Value, ClientError> {
        let id = Uuid::new_v4().to_string();
        self.write(&ReadPacket {
            id: Some(id.clone()),
            pattern: pattern.to_string(),
            data,
        })
        .await?;

        while let Some(line) = self.lines.next_line().await? {
            let reply: WritePacket = serde_json::from_str(&line)?;
            if reply.id != id {
                tracing::debug!(id = %reply.id, "Ignoring reply for another request");
                continue;
            }
            return match reply.err {
                Some(err) => Err(ClientError::Remote(err)),
                None => Ok(reply.response.unwrap_or(Value::Null)),
            };
        }
        Err(ClientError::Closed)
    }

    /// Fire an event; no reply is expected.
    pub async fn emit(&mut self, pattern: &str, data: Value) -> Result<(), ClientError> {
        self.write(&ReadPacket {
            id: None,
            pattern: pattern.to_string(),
            data,
        })
        .await
    }

    async fn write(&mut self, packet: &ReadPacket) -> Result<(), ClientError> {
        let mut encoded = serde_json::to_string(packet)?;
        encoded.push('\n');
        self.writer.write_all(encoded.as_bytes()).await?;
        Ok(())
    }
}
