//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_admissions_total` (counter): admission decisions by class, outcome
//! - `webhook_auth_total` (counter): webhook authentication by outcome
//! - `http_requests_total` (counter): responses by method, status
//! - `http_request_duration_seconds` (histogram): handler latency
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::EndpointClass;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_admission(class: EndpointClass, outcome: &'static str) {
    metrics::counter!(
        "gate_admissions_total",
        "class" => class.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_webhook_auth(outcome: &'static str) {
    metrics::counter!("webhook_auth_total", "outcome" => outcome).increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
