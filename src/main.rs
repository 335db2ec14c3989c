//! Application bootstrap binary.
//!
//! Starts an axum application under the configured global prefix, attaches
//! the configured TCP microservices, and binds the HTTP listener, moving to
//! the next port while the requested one is busy (unless auto-listen is off).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use clap::Parser;
use serde_json::{json, Value};

use app_bootstrap::app_config::RequestMethod;
use app_bootstrap::config::{load_config, BootstrapConfig};
use app_bootstrap::lifecycle::signals::shutdown_signal;
use app_bootstrap::net::AutoListen;
use app_bootstrap::observability::{init_tracing, metrics};
use app_bootstrap::{Application, AxumAdapter, GlobalPrefixOptions};

#[derive(Parser)]
#[command(name = "app-bootstrap")]
#[command(about = "Boot an HTTP application with hybrid microservices", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the listener host.
    #[arg(long)]
    host: Option<String>,

    /// Fail instead of moving to the next port when the port is busy.
    #[arg(long)]
    no_auto_listen: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BootstrapConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if let Some(host) = cli.host {
        config.listener.host = host;
    }
    if cli.no_auto_listen {
        config.listener.auto_listen = Some(AutoListen::Enabled(false));
    }

    init_tracing(&config.observability.log_level);
    tracing::info!("app-bootstrap v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let adapter = Arc::new(AxumAdapter::new(Router::new()));
    let app = Application::new(adapter.clone(), config.listener.application_options());
    app.set_global_prefix(
        config.application.global_prefix.clone(),
        GlobalPrefixOptions {
            exclude: config.application.exclude.clone(),
        },
    );
    adapter.set_http_server(build_router(&app));

    for microservice in &config.microservices {
        let instance = app
            .connect_microservice(microservice.options(), Some(microservice.hybrid_options()))
            .await;
        let name = microservice.name.clone();
        instance.add_handler("ping", move |data: Value| Ok(json!({ "service": name, "echo": data })));
        if microservice.defer_initialization {
            continue;
        }
        if let Err(e) = instance.ready().await {
            tracing::warn!(microservice = %microservice.name, error = %e, "Microservice not ready");
        }
    }

    app.init().await?;
    app.start_all_microservices().await?;
    let addr = app
        .listen_on(config.listener.port, Some(config.listener.host.as_str()))
        .await?;
    tracing::info!(address = %addr, "Ready");

    shutdown_signal().await;
    app.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Demo routes, mounted under the global prefix unless excluded.
fn build_router(app: &Application) -> Router {
    let config = app.config();
    Router::new()
        .route(
            &config.route_path("health", RequestMethod::Get),
            get(|| async { Json(json!({ "status": "ok" })) }),
        )
        .route(
            &config.route_path("/", RequestMethod::Get),
            get(|| async { "app-bootstrap" }),
        )
}
