//! Metrics collection and exposition.
//!
//! # Metrics
//! - `resourceful_requests_total` (counter): requests by method, status, controller, action
//! - `resourceful_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Recording is a no-op until [`init_metrics`] installs the exporter
//! - Labels stay low-cardinality: no paths, no ids

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "resourceful_requests_total";
pub const REQUEST_DURATION: &str = "resourceful_request_duration_seconds";

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    metrics::describe_counter!(REQUESTS_TOTAL, "Requests served, by controller action");
    metrics::describe_histogram!(
        REQUEST_DURATION,
        metrics::Unit::Seconds,
        "Time from routing to response"
    );
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one served request.
pub fn record_request(
    method: &str,
    status: u16,
    controller: &'static str,
    action: &'static str,
    start: Instant,
) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("controller", controller.to_string()),
        ("action", action.to_string()),
    ];
    metrics::counter!(REQUESTS_TOTAL, &labels).increment(1);
    metrics::histogram!(REQUEST_DURATION, &labels).record(start.elapsed().as_secs_f64());
}
