// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured coordinator metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn coordinator_metrics() -> &'static dyn CoordinatorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured gateway metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn gateway_metrics() -> &'static dyn GatewayMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics related to MPIC orchestration.
pub trait CoordinatorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for coordinations, labeled by check type and verdict.
    fn inc_coordinations_total(&self, check_type: &str, outcome: &str);
    /// Observes how many attempts a coordination consumed before terminating.
    fn observe_attempts(&self, attempts: f64);
    /// Observes the wall-clock duration of one cohort dispatch.
    fn observe_dispatch_duration(&self, check_type: &str, duration_secs: f64);
    /// Increments the counter for remote calls converted to synthetic failures.
    fn inc_remote_call_failures(&self, perspective_code: &str);
}
impl CoordinatorMetricsSink for NopSink {
    fn inc_coordinations_total(&self, _check_type: &str, _outcome: &str) {}
    fn observe_attempts(&self, _attempts: f64) {}
    fn observe_dispatch_duration(&self, _check_type: &str, _duration_secs: f64) {}
    fn inc_remote_call_failures(&self, _perspective_code: &str) {}
}

/// A sink for metrics related to the public HTTP gateway.
pub trait GatewayMetricsSink: Send + Sync + std::fmt::Debug {
    /// Observes the latency of a gateway request, labeled by route.
    fn observe_request_duration(&self, route: &str, duration_secs: f64);
    /// Increments a counter for total gateway requests, labeled by route and status code.
    fn inc_requests_total(&self, route: &str, status_code: u16);
}
impl GatewayMetricsSink for NopSink {
    fn observe_request_duration(&self, _route: &str, _duration_secs: f64) {}
    fn inc_requests_total(&self, _route: &str, _status_code: u16) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink: CoordinatorMetricsSink + GatewayMetricsSink + ErrorMetricsSink {}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where T: CoordinatorMetricsSink + GatewayMetricsSink + ErrorMetricsSink {}
