//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bootstrap_bind_attempts_total` (counter): bind attempts by outcome
//! - `bootstrap_initializations_total` (counter): completed initializations by component
//! - `bootstrap_init_duration_seconds` (histogram): time spent initializing

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome label of a single bind attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcomeLabel {
    Success,
    InUse,
    Error,
}

impl BindOutcomeLabel {
    fn as_str(&self) -> &'static str {
        match self {
            BindOutcomeLabel::Success => "success",
            BindOutcomeLabel::InUse => "in_use",
            BindOutcomeLabel::Error => "error",
        }
    }
}

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_bind_attempt(outcome: BindOutcomeLabel) {
    metrics::counter!("bootstrap_bind_attempts_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_initialization(component: &'static str, elapsed: Duration) {
    metrics::counter!("bootstrap_initializations_total", "component" => component).increment(1);
    metrics::histogram!("bootstrap_init_duration_seconds", "component" => component)
        .record(elapsed.as_secs_f64());
}
