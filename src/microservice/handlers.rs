//! Message handler registry.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use super::packet::{ReadPacket, WritePacket};

/// Handler invoked with a packet's `data`.
pub type MessageHandler = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Pattern → handler map shared between a microservice and its transport.
#[derive(Default)]
pub struct MessageHandlers {
    handlers: DashMap<String, MessageHandler>,
}

impl MessageHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `pattern`, replacing any previous one.
    pub fn add<F>(&self, pattern: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.handlers.insert(pattern.into(), Arc::new(handler));
    }

    pub fn get(&self, pattern: &str) -> Option<MessageHandler> {
        self.handlers.get(pattern).map(|h| Arc::clone(h.value()))
    }

    pub fn patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        patterns.sort();
        patterns
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `packet`. Returns the reply for requests, `None` for events.
    pub fn dispatch(&self, packet: ReadPacket) -> Option<WritePacket> {
        let result = match self.get(&packet.pattern) {
            Some(handler) => handler(packet.data),
            None => Err(format!("no handler registered for pattern `{}`", packet.pattern)),
        };

        match (packet.id, result) {
            (Some(id), Ok(response)) => Some(WritePacket::response(id, response)),
            (Some(id), Err(err)) => Some(WritePacket::error(id, err)),
            (None, Err(err)) => {
                tracing::warn!(pattern = %packet.pattern, error = %err, "Event handler failed");
                None
            }
            (None, Ok(_)) => None,
        }
    }
}
