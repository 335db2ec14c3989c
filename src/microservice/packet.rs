//! Wire packets of the TCP transport.
//!
//! One JSON document per line. A request carries an `id` and gets exactly
//! one reply with the same `id`; a packet without `id` is an event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Packet sent by a client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReadPacket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub pattern: String,
    #[serde(default)]
    pub data: Value,
}

/// Reply to a request packet.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WritePacket {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    pub is_disposed: bool,
}

impl WritePacket {
    pub fn response(id: String, response: Value) -> Self {
        Self {
            id,
            response: Some(response),
            err: None,
            is_disposed: true,
        }
    }

    pub fn error(id: String, err: impl Into<String>) -> Self {
        Self {
            id,
            response: None,
            err: Some(err.into()),
            is_disposed: true,
        }
    }
}
