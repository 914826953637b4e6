// Path: crates/telemetry/src/http.rs
//! The operational endpoints every mpicd process serves: Prometheus metrics,
//! liveness, and role-aware readiness.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

/// What this process reports about itself on `/readyz`.
#[derive(Debug, Clone, Default)]
pub struct OpsInfo {
    /// The MPIC roles this deployment serves: `coordinator`, `perspective`.
    pub roles: Vec<&'static str>,
}

async fn metrics_handler() -> Response {
    let metric_families = prometheus::gather();
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::error!(target: "telemetry", error = %e, "metrics encoding failed");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    ([(CONTENT_TYPE, encoder.format_type().to_string())], buf).into_response()
}

async fn healthz_handler() -> &'static str {
    "OK"
}

/// Ready iff at least one role is enabled; the body names the roles so an
/// operator can tell a coordinator probe from a perspective probe.
async fn readyz_handler(State(info): State<Arc<OpsInfo>>) -> Response {
    if info.roles.is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "ready": false, "roles": [] })),
        )
            .into_response();
    }
    Json(serde_json::json!({ "ready": true, "roles": info.roles })).into_response()
}

fn ops_router(info: OpsInfo) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(Arc::new(info))
}

/// Serves the ops endpoints until ctrl-c.
pub async fn run_server(addr: SocketAddr, info: OpsInfo) {
    let app = ops_router(info);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(target: "telemetry", error = %e, "failed to bind ops server");
            return;
        }
    };
    tracing::info!(target: "telemetry", %addr, "ops endpoints listening");

    let serve = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = serve.await {
        tracing::error!(target: "telemetry", error = %e, "ops server error");
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(target: "telemetry", error = %e, "failed to install shutdown handler");
    }
}
