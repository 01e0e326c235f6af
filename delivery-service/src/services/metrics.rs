//! Prometheus metrics for delivery-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Store request duration histogram by operation and collection.
pub static STORE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "backoffice_store_request_duration_seconds",
        "Record store request duration in seconds",
        &["operation", "collection"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register store_request_duration")
});

/// Deliveries promoted out of the pending queue.
pub static DELIVERIES_APPROVED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_deliveries_approved_total",
        "Total pending deliveries approved into the delivery ledger",
        &["status"] // ok, error
    )
    .expect("Failed to register deliveries_approved")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "backoffice_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&STORE_REQUEST_DURATION);
    Lazy::force(&DELIVERIES_APPROVED);
    Lazy::force(&ERRORS_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
