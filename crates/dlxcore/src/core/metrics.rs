//! Metrics collection using Prometheus
//!
//! Tracks request volume per operation, failures by public failure kind,
//! and how long the extraction engine takes.

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

lazy_static! {
    /// Requests handled by the fetch layer
    /// Labels: operation (resolve/fetch), mode (info/video/audio)
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "videodlx_requests_total",
        "Total number of resolve/fetch requests",
        &["operation", "mode"]
    )
    .unwrap();

    /// Failed requests
    /// Labels: operation, kind (invalid_input/resolution_failed/artifact_not_found)
    pub static ref FAILURES_TOTAL: CounterVec = register_counter_vec!(
        "videodlx_failures_total",
        "Total number of failed resolve/fetch requests",
        &["operation", "kind"]
    )
    .unwrap();

    /// Engine errors by yt-dlp error category
    pub static ref ENGINE_ERRORS_TOTAL: CounterVec = register_counter_vec!(
        "videodlx_engine_errors_total",
        "Total number of extraction engine errors by category",
        &["operation", "category"]
    )
    .unwrap();

    /// Extraction engine execution duration
    /// Labels: operation (metadata/download)
    pub static ref ENGINE_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "videodlx_engine_duration_seconds",
        "Time spent in extraction engine calls",
        &["operation"],
        vec![0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]
    )
    .unwrap();
}

/// Initialize all metrics so they appear in /metrics before the first request
pub fn init_metrics() {
    log::info!("Initializing metrics registry...");

    for (operation, mode) in [("resolve", "info"), ("fetch", "video"), ("fetch", "audio")] {
        REQUESTS_TOTAL.with_label_values(&[operation, mode]);
    }
    let _ = &*FAILURES_TOTAL;
    let _ = &*ENGINE_ERRORS_TOTAL;
    let _ = &*ENGINE_DURATION_SECONDS;
}

/// Helper function to record a handled request
pub fn record_request(operation: &str, mode: &str) {
    REQUESTS_TOTAL.with_label_values(&[operation, mode]).inc();
}

/// Helper function to record a failed request
pub fn record_failure(operation: &str, kind: &str) {
    FAILURES_TOTAL.with_label_values(&[operation, kind]).inc();
}

/// Helper function to record an engine error
pub fn record_engine_error(operation: &str, category: &str) {
    ENGINE_ERRORS_TOTAL.with_label_values(&[operation, category]).inc();
}

/// Helper function to record engine execution time
pub fn observe_engine_duration(operation: &str, seconds: f64) {
    ENGINE_DURATION_SECONDS.with_label_values(&[operation]).observe(seconds);
}
