//! Initialization and listening of the primary application.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use app_bootstrap::app_config::{Enhancer, RequestMethod, RouteMatcher};
use app_bootstrap::error::{InitError, ListenError};
use app_bootstrap::lifecycle::{HookError, Module};
use app_bootstrap::net::{AutoListen, AutoListenSettings};
use app_bootstrap::{Application, ApplicationOptions, AxumAdapter, GlobalPrefixOptions};
use async_trait::async_trait;
use axum::{routing::get, Router};
use parking_lot::Mutex;

mod common;

use common::{occupy_port, CountingAdapter, RecordingLogger};

fn application(
    adapter: Arc<CountingAdapter>,
    options: ApplicationOptions,
) -> (Application, Arc<RecordingLogger>) {
    let logger = RecordingLogger::shared();
    let app = Application::new(adapter, options).with_logger(logger.clone());
    (app, logger)
}

/// Module that appends its hook calls to a shared journal.
struct JournalModule {
    name: &'static str,
    journal: Arc<Mutex<Vec<String>>>,
    fail_init: AtomicU32,
}

impl JournalModule {
    fn new(name: &'static str, journal: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal,
            fail_init: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl Module for JournalModule {
    fn name(&self) -> &str {
        self.name
    }

    async fn on_module_init(&self) -> Result<(), HookError> {
        self.journal.lock().push(format!("{}:init", self.name));
        if self
            .fail_init
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err("database offline".into());
        }
        Ok(())
    }

    async fn on_application_bootstrap(&self) -> Result<(), HookError> {
        self.journal.lock().push(format!("{}:bootstrap", self.name));
        Ok(())
    }

    async fn on_application_shutdown(&self) -> Result<(), HookError> {
        self.journal.lock().push(format!("{}:shutdown", self.name));
        Ok(())
    }
}

#[derive(Debug)]
struct LoggingInterceptor;

impl Enhancer for LoggingInterceptor {}

#[tokio::test]
async fn init_twice_runs_adapter_init_once() {
    let adapter = Arc::new(CountingAdapter::new());
    let (app, _) = application(adapter.clone(), ApplicationOptions::default());

    assert!(!app.is_initialized());
    let first = app.init().await.unwrap();
    let second = app.init().await.unwrap();

    assert_eq!(adapter.init_calls(), 1);
    assert_eq!(first, second);
    assert!(app.is_initialized());
}

#[tokio::test]
async fn concurrent_init_shares_one_run() {
    let adapter = Arc::new(CountingAdapter::new().with_init_delay(Duration::from_millis(50)));
    let (app, _) = application(adapter.clone(), ApplicationOptions::default());

    let (a, b, c) = tokio::join!(app.init(), app.init(), app.init());

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(adapter.init_calls(), 1);
}

#[tokio::test]
async fn concurrent_init_shares_one_failure() {
    let adapter = Arc::new(
        CountingAdapter::new()
            .with_init_delay(Duration::from_millis(50))
            .failing_init(1),
    );
    let (app, _) = application(adapter.clone(), ApplicationOptions::default());

    let (a, b, c) = tokio::join!(app.init(), app.init(), app.init());

    assert!(matches!(a, Err(InitError::Adapter { .. })));
    assert!(matches!(b, Err(InitError::Adapter { .. })));
    assert!(matches!(c, Err(InitError::Adapter { .. })));
    assert_eq!(adapter.init_calls(), 1);
    assert!(!app.is_initialized());

    app.init().await.unwrap();
    assert_eq!(adapter.init_calls(), 2);
}

#[tokio::test]
async fn failed_init_can_be_retried() {
    let adapter = Arc::new(CountingAdapter::new().failing_init(1));
    let (app, logger) = application(adapter.clone(), ApplicationOptions::default());

    let err = app.init().await.unwrap_err();
    assert!(matches!(err, InitError::Adapter { .. }));
    assert!(!app.is_initialized());
    assert_eq!(logger.errors().len(), 1);

    app.init().await.unwrap();
    assert!(app.is_initialized());
    assert_eq!(adapter.init_calls(), 2);
}

#[tokio::test]
async fn hooks_run_in_order_around_adapter_init() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let adapter = Arc::new(CountingAdapter::new());
    let (app, logger) = application(adapter.clone(), ApplicationOptions::default());
    app.register_module(JournalModule::new("users", journal.clone()));
    app.register_module(JournalModule::new("orders", journal.clone()));

    let report = app.init().await.unwrap();
    assert_eq!(report.modules, 2);
    assert_eq!(
        journal.lock().as_slice(),
        ["users:init", "orders:init", "users:bootstrap", "orders:bootstrap"]
    );
    assert!(logger.has_log("Application successfully started"));

    app.close().await;
    assert_eq!(&journal.lock()[4..], ["orders:shutdown", "users:shutdown"]);
    assert_eq!(adapter.closed(), 1);
}

#[tokio::test]
async fn module_failure_stops_before_adapter_init() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let adapter = Arc::new(CountingAdapter::new());
    let (app, _) = application(adapter.clone(), ApplicationOptions::default());
    let module = JournalModule::new("db", journal.clone());
    module.fail_init.store(1, Ordering::SeqCst);
    app.register_module(module);

    let err = app.init().await.unwrap_err();
    assert_eq!(
        err,
        InitError::Module {
            module: "db".into(),
            hook: "on_module_init",
            message: "database offline".into(),
        }
    );
    assert_eq!(adapter.init_calls(), 0);

    app.init().await.unwrap();
    assert_eq!(adapter.init_calls(), 1);
}

#[tokio::test]
async fn listen_initializes_first() {
    let adapter = Arc::new(CountingAdapter::new());
    let (app, _) = application(adapter.clone(), ApplicationOptions::default());

    let addr = app.listen(3000).await.unwrap();
    assert_eq!(addr.port(), 3000);
    assert!(app.is_initialized());
    assert_eq!(adapter.init_calls(), 1);
    assert_eq!(app.local_addr().await, Some(addr));
}

#[tokio::test]
async fn busy_port_moves_to_next_with_auto_listen_default() {
    let adapter = Arc::new(CountingAdapter::new().busy(3000, 1));
    let (app, logger) = application(adapter.clone(), ApplicationOptions::default());

    let addr = app.listen(3000).await.unwrap();

    assert_eq!(addr.port(), 3001);
    assert_eq!(adapter.listened(), [3000, 3001]);
    assert!(logger.has_log("Port 3000 is in use, trying port 3001 instead"));
    assert!(logger.errors().is_empty());
}

#[tokio::test]
async fn busy_port_fails_when_auto_listen_disabled() {
    let disabled = [
        AutoListen::Enabled(false),
        AutoListen::Settings(AutoListenSettings::default()),
    ];

    for auto_listen in disabled {
        let adapter = Arc::new(CountingAdapter::new().busy(3000, 1));
        let options = ApplicationOptions::default().with_auto_listen(auto_listen);
        let (app, logger) = application(adapter.clone(), options);

        let err = app.listen(3000).await.unwrap_err();

        assert!(matches!(err, ListenError::AddressInUse { port: 3000, .. }));
        assert!(err.to_string().contains("EADDRINUSE"));
        assert_eq!(adapter.listened(), [3000]);
        assert_eq!(logger.errors().len(), 1);
        assert!(logger.errors()[0].contains("EADDRINUSE"));
        assert!(app.local_addr().await.is_none());
    }
}

#[tokio::test]
async fn explicit_enabled_settings_retry() {
    let adapter = Arc::new(CountingAdapter::new().busy(5000, 1).busy(5001, 1));
    let options = ApplicationOptions::default().with_auto_listen(AutoListen::Settings(AutoListenSettings {
        enabled: Some(true),
        max_attempts: Some(5),
    }));
    let (app, logger) = application(adapter.clone(), options);

    let addr = app.listen(5000).await.unwrap();
    assert_eq!(addr.port(), 5002);
    assert_eq!(adapter.listened(), [5000, 5001, 5002]);
    assert_eq!(logger.logs().iter().filter(|m| m.contains("is in use")).count(), 2);
}

#[tokio::test]
async fn global_settings_are_exposed_on_the_application() {
    let adapter = Arc::new(CountingAdapter::new());
    let (app, _) = application(adapter, ApplicationOptions::default());

    app.set_global_prefix(
        "api",
        GlobalPrefixOptions::exclude([
            RouteMatcher::from("foo"),
            RouteMatcher::from(("bar", RequestMethod::Get)),
        ]),
    )
    .use_global_interceptors([Arc::new(LoggingInterceptor) as Arc<dyn Enhancer>]);

    let options = app.config().global_prefix_options();
    assert_eq!(options.exclude.len(), 2);
    assert_eq!(options.exclude[0].path, "/foo");
    assert_eq!(options.exclude[0].method, RequestMethod::All);
    assert_eq!(options.exclude[1].path, "/bar");
    assert_eq!(options.exclude[1].method, RequestMethod::Get);
    assert_eq!(app.config().global_interceptors().len(), 1);
    assert_eq!(app.config().route_path("users", RequestMethod::Get), "/api/users");
    assert_eq!(app.config().route_path("foo", RequestMethod::Post), "/foo");
}

#[tokio::test]
async fn axum_adapter_moves_past_a_real_busy_port() {
    let (_occupied, busy_port) = occupy_port().await;
    let adapter = Arc::new(AxumAdapter::new(
        Router::new().route("/health", get(|| async { "ok" })),
    ));
    let logger = RecordingLogger::shared();
    let app = Application::new(adapter.clone(), ApplicationOptions::default()).with_logger(logger.clone());

    let addr = app.listen_on(busy_port, Some("127.0.0.1")).await.unwrap();

    assert!(addr.port() > busy_port);
    assert!(logger.has_log(&format!(
        "Port {busy_port} is in use, trying port {} instead",
        busy_port + 1
    )));
    assert!(logger.errors().is_empty());
    assert_eq!(adapter.init_calls(), 1);

    let body = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .expect("server unreachable")
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");

    app.close().await;
    assert!(adapter.local_addr().is_none());
    // The port is released on close.
    tokio::net::TcpListener::bind(addr).await.unwrap();
}

#[tokio::test]
async fn axum_adapter_reports_busy_port_without_auto_listen() {
    let (_occupied, busy_port) = occupy_port().await;
    let adapter = Arc::new(AxumAdapter::new(Router::new()));
    let logger = RecordingLogger::shared();
    let options = ApplicationOptions::default().with_auto_listen(AutoListen::Enabled(false));
    let app = Application::new(adapter, options).with_logger(logger.clone());

    let err = app.listen_on(busy_port, Some("127.0.0.1")).await.unwrap_err();

    assert_eq!(err.code(), Some("EADDRINUSE"));
    assert!(err.to_string().contains("EADDRINUSE"));
    assert_eq!(logger.errors().len(), 1);
}
