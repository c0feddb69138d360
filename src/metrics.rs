use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("persona_requests_total", "Total number of chat requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("persona_rate_limited_total", "Chat requests rejected by the rate limiter").unwrap();
    pub static ref UPSTREAM_ERRORS: Counter =
        register_counter!("persona_upstream_errors_total", "Failed calls to the upstream API").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "persona_request_latency_seconds",
        "Upstream round-trip latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge =
        register_gauge!("persona_rate_limit_entries", "Identifiers currently tracked by the rate limiter").unwrap();
}
