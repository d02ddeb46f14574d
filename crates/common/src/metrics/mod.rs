//! Metrics and observability utilities
//!
//! Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all Maktaba metrics
pub const METRICS_PREFIX: &str = "maktaba";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.075, 0.100, 0.150, 0.250, 0.500, 1.000, 2.500, 5.000,
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_reviews_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of reviews created"
    );

    describe_counter!(
        format!("{}_moderation_decisions_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of admin moderation decisions"
    );

    describe_counter!(
        format!("{}_likes_toggled_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of like toggles"
    );

    describe_histogram!(
        format!("{}_db_ping_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Readiness-probe database ping latency in seconds"
    );
}

/// Record a review creation
pub fn record_review_created() {
    counter!(format!("{}_reviews_created_total", METRICS_PREFIX)).increment(1);
}

/// Record a moderation decision ("approved" or "rejected")
pub fn record_moderation_decision(decision: &'static str) {
    counter!(
        format!("{}_moderation_decisions_total", METRICS_PREFIX),
        "decision" => decision
    )
    .increment(1);
}

/// Record a readiness-probe database ping ("up" or "down")
pub fn record_db_ping(status: &'static str, seconds: f64) {
    histogram!(
        format!("{}_db_ping_duration_seconds", METRICS_PREFIX),
        "status" => status
    )
    .record(seconds);
}

/// Record a like toggle on a review or highlight
pub fn record_like_toggled(target: &'static str) {
    counter!(
        format!("{}_likes_toggled_total", METRICS_PREFIX),
        "target" => target
    )
    .increment(1);
}
