//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): aggregation requests by status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_dependency_outcomes_total` (counter): outcomes by dependency, status
//! - `gateway_dependency_duration_seconds` (histogram): per-dependency latency
//! - `gateway_dependency_health` (gauge): 1=healthy, 0=unhealthy
//!
//! # Design Decisions
//! - Low-overhead updates (atomic operations inside the metrics crate)
//! - Labels for dependency name and outcome status

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics exporter"),
    }
}

/// Record one aggregation request.
pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("gateway_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one dependency outcome and its latency.
pub fn record_dependency(name: &str, status: &str, elapsed: Duration) {
    metrics::counter!(
        "gateway_dependency_outcomes_total",
        "dependency" => name.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    metrics::histogram!(
        "gateway_dependency_duration_seconds",
        "dependency" => name.to_string(),
    )
    .record(elapsed.as_secs_f64());
}

/// Record a dependency's current health.
pub fn record_dependency_health(name: &str, healthy: bool) {
    metrics::gauge!(
        "gateway_dependency_health",
        "dependency" => name.to_string(),
    )
    .set(if healthy { 1.0 } else { 0.0 });
}
