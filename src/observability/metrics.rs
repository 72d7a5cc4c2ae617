//! Metrics collection and exposition.
//!
//! # Metrics
//! - `shield_requests_total` (counter): requests by `decision` (allow, block)
//! - `shield_blocked_total` (counter): blocks by signature `family` and `status`
//! - `shield_upstream_errors_total` (counter): failed forwards in the gateway
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; a no-op until a recorder exists
//! - Prometheus exporter is optional and owns its own listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::engine::BlockStatus;
use crate::rules::ProbeFamily;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_allowed() {
    metrics::counter!("shield_requests_total", "decision" => "allow").increment(1);
}

pub fn record_blocked(family: Option<ProbeFamily>, status: BlockStatus) {
    let family = family.map(|f| f.as_str()).unwrap_or("unknown");
    metrics::counter!("shield_requests_total", "decision" => "block").increment(1);
    metrics::counter!(
        "shield_blocked_total",
        "family" => family,
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}

pub fn record_upstream_error() {
    metrics::counter!("shield_upstream_errors_total").increment(1);
}
