use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, Encoder, IntCounter,
    IntCounterVec, IntGauge, TextEncoder,
};
use service::ServiceError;

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("item_store_requests_total", "Total requests reaching item routes")
        .expect("register requests_total")
});

pub static UNAUTHORIZED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "item_store_unauthorized_total",
        "Total requests rejected for a missing Authorization header"
    )
    .expect("register unauthorized_total")
});

pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "item_store_operations_total",
        "Item store operations by kind and outcome",
        &["op", "outcome"]
    )
    .expect("register operations_total")
});

// Set from the store at startup, then moved by successful creates and deletes.
pub static ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("item_store_items", "Number of items currently stored")
        .expect("register items")
});

/// Count one store operation under `op`, labelled `ok` or with the error kind.
pub fn record<T>(op: &str, result: &Result<T, ServiceError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    OPERATIONS_TOTAL.with_label_values(&[op, outcome]).inc();
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
