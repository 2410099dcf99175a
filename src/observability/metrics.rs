//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webhook_requests_total` (counter): requests by route, status
//! - `webhook_request_duration_seconds` (histogram): handler latency by route
//! - `webhook_capture_failures_total` (counter): body streams that failed mid-read
//! - `webhook_parse_failures_total` (counter): malformed bodies by policy
//! - `webhook_records_enqueued_total` (counter): records handed to the sink
//! - `webhook_sink_records_written_total` (counter): records appended to disk
//! - `webhook_sink_bytes_written_total` (counter): bytes appended to disk
//! - `webhook_sink_write_errors_total` (counter): sink failures by kind
//!
//! # Design Decisions
//! - Updates go through the `metrics` facade; without an installed
//!   recorder they are no-ops
//! - Prometheus exporter is opt-in

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "webhook_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("webhook_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_capture_failure(route: &str) {
    metrics::counter!("webhook_capture_failures_total", "route" => route.to_string()).increment(1);
}

pub fn record_parse_failure(policy: &'static str) {
    metrics::counter!("webhook_parse_failures_total", "policy" => policy).increment(1);
}

pub fn record_enqueued() {
    metrics::counter!("webhook_records_enqueued_total").increment(1);
}

pub fn record_sink_write(bytes: usize) {
    metrics::counter!("webhook_sink_records_written_total").increment(1);
    metrics::counter!("webhook_sink_bytes_written_total").increment(bytes as u64);
}

pub fn record_sink_error(kind: &'static str) {
    metrics::counter!("webhook_sink_write_errors_total", "kind" => kind).increment(1);
}
