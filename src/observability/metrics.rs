//! Metrics collection and exposition.
//!
//! # Metrics
//! - `courier_dispatch_attempts_total` (counter): outbound attempts by outcome
//! - `courier_dispatch_outcomes_total` (counter): terminal dispatch results by outcome
//! - `courier_gate_decisions_total` (counter): authentication gate decisions
//! - `courier_route_misses_total` (counter): inbound requests with no route, by method

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch_attempt(outcome: &'static str) {
    counter!("courier_dispatch_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_dispatch_outcome(outcome: &'static str) {
    counter!("courier_dispatch_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_gate_decision(decision: &'static str) {
    counter!("courier_gate_decisions_total", "decision" => decision).increment(1);
}

pub fn record_route_miss(method: &str) {
    counter!("courier_route_misses_total", "method" => method.to_string()).increment(1);
}
