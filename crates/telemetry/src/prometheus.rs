// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, linear_buckets, register_histogram, register_histogram_vec,
    register_int_counter_vec, Histogram, HistogramVec, IntCounterVec,
};

// --- Metric Statics ---
// OnceCell holds the collectors; `install` initializes them exactly once.

static COORDINATIONS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static COORDINATION_ATTEMPTS: OnceCell<Histogram> = OnceCell::new();
static DISPATCH_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static REMOTE_CALL_FAILURES_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static GATEWAY_REQUESTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static GATEWAY_REQUEST_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

/// The Prometheus-backed implementation of every metrics sink.
#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Helper macro to reduce boilerplate for getting a metric from OnceCell.
/// This will panic if `install()` has not been called, which is intentional
/// as it indicates a critical application setup error.
macro_rules! get_metric {
    ($metric:ident) => {
        $metric
            .get()
            .expect("Prometheus sink not initialized. Call telemetry::prometheus::install() first.")
    };
}

/// Registers all collectors and installs `PrometheusSink` as the global sink.
/// Idempotent; later calls are no-ops.
pub fn install() {
    let _ = COORDINATIONS_TOTAL.set(
        register_int_counter_vec!(
            "mpic_coordinations_total",
            "Total MPIC coordinations, by check type and verdict",
            &["check_type", "outcome"]
        )
        .expect("register_int_counter_vec"),
    );
    let _ = COORDINATION_ATTEMPTS.set(
        register_histogram!(
            "mpic_coordination_attempts",
            "Attempts consumed per coordination",
            linear_buckets(1.0, 1.0, 10).expect("buckets")
        )
        .expect("register_histogram"),
    );
    let _ = DISPATCH_DURATION_SECONDS.set(
        register_histogram_vec!(
            "mpic_dispatch_duration_seconds",
            "Wall-clock duration of one cohort dispatch (seconds)",
            &["check_type"],
            exponential_buckets(0.005, 2.0, 14).expect("buckets")
        )
        .expect("register_histogram_vec"),
    );
    let _ = REMOTE_CALL_FAILURES_TOTAL.set(
        register_int_counter_vec!(
            "mpic_remote_call_failures_total",
            "Remote perspective calls converted to synthetic failed responses",
            &["perspective"]
        )
        .expect("register_int_counter_vec"),
    );
    let _ = GATEWAY_REQUESTS_TOTAL.set(
        register_int_counter_vec!(
            "mpic_gateway_requests_total",
            "Total HTTP gateway requests, by route and status",
            &["route", "status"]
        )
        .expect("register_int_counter_vec"),
    );
    let _ = GATEWAY_REQUEST_DURATION_SECONDS.set(
        register_histogram_vec!(
            "mpic_gateway_request_duration_seconds",
            "Latency of HTTP gateway requests (seconds)",
            &["route"],
            exponential_buckets(0.001, 2.0, 15).expect("buckets")
        )
        .expect("register_histogram_vec"),
    );
    let _ = ERRORS_TOTAL.set(
        register_int_counter_vec!(
            "mpic_errors_total",
            "Structured errors, by kind and variant",
            &["kind", "variant"]
        )
        .expect("register_int_counter_vec"),
    );

    static SINK_INSTANCE: PrometheusSink = PrometheusSink;
    let _ = crate::sinks::SINK.set(&SINK_INSTANCE);
}

impl CoordinatorMetricsSink for PrometheusSink {
    fn inc_coordinations_total(&self, check_type: &str, outcome: &str) {
        get_metric!(COORDINATIONS_TOTAL)
            .with_label_values(&[check_type, outcome])
            .inc();
    }
    fn observe_attempts(&self, attempts: f64) {
        get_metric!(COORDINATION_ATTEMPTS).observe(attempts);
    }
    fn observe_dispatch_duration(&self, check_type: &str, duration_secs: f64) {
        get_metric!(DISPATCH_DURATION_SECONDS)
            .with_label_values(&[check_type])
            .observe(duration_secs);
    }
    fn inc_remote_call_failures(&self, perspective_code: &str) {
        get_metric!(REMOTE_CALL_FAILURES_TOTAL)
            .with_label_values(&[perspective_code])
            .inc();
    }
}

impl GatewayMetricsSink for PrometheusSink {
    fn observe_request_duration(&self, route: &str, duration_secs: f64) {
        get_metric!(GATEWAY_REQUEST_DURATION_SECONDS)
            .with_label_values(&[route])
            .observe(duration_secs);
    }
    fn inc_requests_total(&self, route: &str, status_code: u16) {
        get_metric!(GATEWAY_REQUESTS_TOTAL)
            .with_label_values(&[route, &status_code.to_string()])
            .inc();
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        get_metric!(ERRORS_TOTAL)
            .with_label_values(&[kind, variant])
            .inc();
    }
}
