// Path: crates/telemetry/src/time.rs
use crate::sinks::GatewayMetricsSink;
use std::time::Instant;

/// Observes the latency of a gateway route for the lifetime of the guard.
pub struct RouteTimer<'a> {
    sink: &'a dyn GatewayMetricsSink,
    route: &'static str,
    start: Instant,
}

impl<'a> RouteTimer<'a> {
    /// Starts timing `route` against `sink`.
    pub fn new(sink: &'a dyn GatewayMetricsSink, route: &'static str) -> Self {
        Self {
            sink,
            route,
            start: Instant::now(),
        }
    }
}

impl Drop for RouteTimer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_request_duration(self.route, self.start.elapsed().as_secs_f64());
    }
}
