//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method and status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_tls_handshake_failures_total` (counter): rejected handshakes
//!
//! # Design Decisions
//! - Prometheus exposition is opt-in; without a configured scrape
//!   address the recording macros are no-ops
//! - Labels stay low cardinality (method, status)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::Error;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_exporter(addr: SocketAddr) -> Result<(), Error> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| Error::Metrics(e.to_string()))
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, started: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Record a connection dropped during the TLS handshake.
pub fn record_handshake_failure() {
    counter!("gateway_tls_handshake_failures_total").increment(1);
}
