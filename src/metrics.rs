//! Prometheus metrics.
//!
//! Recording goes through the `metrics` facade, so calls are no-ops until
//! [`init`] installs the Prometheus recorder.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::warn;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder (once per process) and return a
/// handle for rendering the exposition text.
pub fn init() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(e) = metrics::set_global_recorder(recorder) {
                warn!("Metrics recorder already installed: {}", e);
            }
            handle
        })
        .clone()
}

/// Count one HTTP request by endpoint and status code.
pub fn record_request(endpoint: &'static str, status: u16) {
    counter!(
        "segmux_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the time spent serving an endpoint since `start`.
pub fn record_duration(endpoint: &'static str, start: Instant) {
    histogram!("segmux_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Count one finished conversion. `outcome` is `ok` or an error kind.
pub fn record_conversion(outcome: &'static str, start: Instant) {
    counter!("segmux_conversions_total", "outcome" => outcome).increment(1);
    histogram!("segmux_conversion_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Count renditions written into playlists, by media kind.
pub fn record_renditions(kind: &'static str, count: usize) {
    counter!("segmux_renditions_total", "kind" => kind).increment(count as u64);
}
