//! Axum-backed HTTP adapter.
//!
//! # Responsibilities
//! - Hold the axum `Router` (the "instance") until it is served
//! - Bind a Tokio `TcpListener` per listen attempt
//! - Wrap the served router in request tracing
//! - Serve with graceful shutdown and release the port on close

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};

use ::axum::Router;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use super::{HttpAdapter, DEFAULT_HOST};
use crate::error::{BindError, InitError};
use crate::lifecycle::Shutdown;

struct RunningServer {
    addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<io::Result<()>>,
}

/// HTTP adapter serving an axum `Router`.
pub struct AxumAdapter {
    router: Mutex<Router>,
    server: Mutex<Option<RunningServer>>,
    init_calls: AtomicU32,
}

impl AxumAdapter {
    pub fn new(router: Router) -> Self {
        Self {
            router: Mutex::new(router),
            server: Mutex::new(None),
            init_calls: AtomicU32::new(0),
        }
    }

    /// The router that will be (or is being) served.
    pub fn get_instance(&self) -> Router {
        self.router.lock().clone()
    }

    /// Replace the router. Only affects servers started afterwards; tracing
    /// is applied at listen time, so replacing after `init` keeps it.
    pub fn set_http_server(&self, router: Router) {
        *self.router.lock() = router;
    }

    /// How many times `init` ran.
    pub fn init_calls(&self) -> u32 {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// Address currently being served, if any.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.lock().as_ref().map(|s| s.addr)
    }
}

#[async_trait]
impl HttpAdapter for AxumAdapter {
    fn name(&self) -> &str {
        "axum"
    }

    async fn init(&self) -> Result<(), InitError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(adapter = self.name(), "HTTP adapter initialized");
        Ok(())
    }

    async fn listen(&self, port: u16, host: Option<&str>) -> Result<SocketAddr, BindError> {
        if let Some(addr) = self.local_addr() {
            return Err(BindError::other(
                port,
                io::ErrorKind::Other,
                format!("adapter is already serving on {addr}"),
            ));
        }

        let host = host.unwrap_or(DEFAULT_HOST);
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| BindError::from_io(port, e))?;
        let addr = listener.local_addr().map_err(|e| BindError::from_io(port, e))?;

        let shutdown = Shutdown::new();
        let app = self.get_instance().layer(TraceLayer::new_for_http());
        let stop = shutdown.signalled();
        let handle = tokio::spawn(async move {
            ::axum::serve(listener, app)
                .with_graceful_shutdown(stop)
                .await
        });

        tracing::debug!(address = %addr, "HTTP server accepting connections");
        *self.server.lock() = Some(RunningServer {
            addr,
            shutdown,
            handle,
        });
        Ok(addr)
    }

    async fn close(&self) {
        let running = self.server.lock().take();
        let Some(running) = running else {
            return;
        };

        running.shutdown.trigger();
        match running.handle.await {
            Ok(Ok(())) => tracing::info!(address = %running.addr, "HTTP server stopped"),
            Ok(Err(e)) => tracing::error!(address = %running.addr, error = %e, "HTTP server failed"),
            Err(e) => tracing::error!(address = %running.addr, error = %e, "HTTP server task panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::axum::routing::get;

    #[tokio::test]
    async fn router_replaced_after_init_is_served() {
        let adapter = AxumAdapter::new(Router::new().route("/old", get(|| async { "old" })));
        adapter.init().await.unwrap();
        adapter.set_http_server(Router::new().route("/new", get(|| async { "new" })));

        let addr = adapter.listen(0, Some("127.0.0.1")).await.unwrap();
        let client = reqwest::Client::builder().no_proxy().build().unwrap();

        let new = client.get(format!("http://{addr}/new")).send().await.unwrap();
        assert_eq!(new.status(), 200);
        assert_eq!(new.text().await.unwrap(), "new");
        let old = client.get(format!("http://{addr}/old")).send().await.unwrap();
        assert_eq!(old.status(), 404);

        adapter.close().await;
        assert!(adapter.local_addr().is_none());
        assert_eq!(adapter.init_calls(), 1);
    }
}
