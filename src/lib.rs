//! Application bootstrap orchestrator.
//!
//! Brings an HTTP application and its hybrid microservices to a running,
//! network-bound state:
//!
//! ```text
//! caller
//!   │ set_global_prefix / use_global_interceptors
//!   ▼
//! Application ──connect_microservice──▶ MicroserviceApplication
//!   │                                    (own or shared config,
//!   │                                     eager or deferred init)
//!   │ init (LifecycleGuard: modules → adapter → bootstrap hooks)
//!   │ listen
//!   ▼
//! PortBinder ──▶ HttpAdapter::listen(3000) ─ in use ─▶ listen(3001) ─▶ bound
//!   └──▶ Logger: "Port 3000 is in use, trying port 3001 instead"
//! ```

pub mod adapter;
pub mod app_config;
pub mod application;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod microservice;
pub mod net;
pub mod observability;

pub use adapter::{AxumAdapter, HttpAdapter};
pub use app_config::{AppConfigHandle, ApplicationConfig, GlobalPrefixOptions, RequestMethod, RouteMatcher};
pub use application::{Application, ApplicationOptions, HybridOptions, MicroserviceApplication};
pub use config::BootstrapConfig;
pub use error::{BindError, InitError, ListenError};
pub use lifecycle::Shutdown;
pub use microservice::{MicroserviceOptions, TcpOptions};
pub use net::{AutoListen, AutoListenPolicy};
pub use observability::{Logger, TracingLogger};
