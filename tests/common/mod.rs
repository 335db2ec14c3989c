//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use app_bootstrap::error::{BindError, InitError};
use app_bootstrap::microservice::{MessageHandlers, Transport};
use app_bootstrap::{HttpAdapter, Logger};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::net::TcpListener;

/// Logger that keeps every message for assertions.
#[derive(Default)]
pub struct RecordingLogger {
    logs: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn has_log(&self, needle: &str) -> bool {
        self.logs.lock().iter().any(|m| m.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn log(&self, _context: &str, message: &str) {
        self.logs.lock().push(message.to_string());
    }

    fn error(&self, _context: &str, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

/// HTTP adapter that counts init calls and scripts bind results per port.
#[derive(Default)]
pub struct CountingAdapter {
    init_calls: AtomicU32,
    init_delay: Option<Duration>,
    init_failures: AtomicU32,
    busy: Mutex<HashMap<u16, u32>>,
    listened: Mutex<Vec<u16>>,
    closed: AtomicU32,
}

impl CountingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = Some(delay);
        self
    }

    /// Fail the next `count` init calls.
    pub fn failing_init(self, count: u32) -> Self {
        self.init_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Report `port` as in use for the next `times` binds.
    pub fn busy(self, port: u16, times: u32) -> Self {
        self.busy.lock().insert(port, times);
        self
    }

    pub fn init_calls(&self) -> u32 {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn listened(&self) -> Vec<u16> {
        self.listened.lock().clone()
    }

    pub fn closed(&self) -> u32 {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpAdapter for CountingAdapter {
    fn name(&self) -> &str {
        "counting"
    }

    async fn init(&self) -> Result<(), InitError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.init_delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .init_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(InitError::Adapter {
                adapter: self.name().to_string(),
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    async fn listen(&self, port: u16, _host: Option<&str>) -> Result<SocketAddr, BindError> {
        self.listened.lock().push(port);
        let busy = match self.busy.lock().get_mut(&port) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };
        if busy {
            return Err(BindError::other(port, io::ErrorKind::AddrInUse, "address already in use"));
        }
        Ok(SocketAddr::from(([127, 0, 0, 1], port)))
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transport that only counts calls.
#[derive(Default)]
pub struct MockTransport {
    init_calls: AtomicU32,
    fail_init: bool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_init: true,
            ..Self::default()
        })
    }

    pub fn init_calls(&self) -> u32 {
        self.init_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn init(&self) -> Result<(), InitError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(InitError::Transport {
                transport: self.name().to_string(),
                message: "broker unreachable".to_string(),
            });
        }
        Ok(())
    }

    async fn listen(&self, _handlers: Arc<MessageHandlers>) -> Result<SocketAddr, BindError> {
        Ok(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    async fn close(&self) {}
}

/// Hold a port open on loopback so binds to it fail with address-in-use.
pub async fn occupy_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}
