// Path: crates/gateway/src/lib.rs
#![forbid(unsafe_code)]

//! # MPIC Gateway
//!
//! The HTTP boundary for both MPIC roles. A coordinator deployment exposes
//! `POST /mpic`; a perspective deployment exposes `POST /caa-check`. The
//! routes a given process serves are decided once at startup from its
//! configuration; the coordinator and checker themselves carry no
//! process-wide state.

pub mod config;
pub mod remote;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use mpic_caa_checker::MpicCaaChecker;
use mpic_coordinator::MpicCoordinator;
use mpic_telemetry::{gateway_metrics, time::RouteTimer};
use mpic_types::check::CaaCheckRequest;
use mpic_types::mpic::ApiResponse;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// The few failures the gateway itself can produce. Everything check-related
/// is reported inside the coordination envelopes, never at this layer, so
/// these reduce to "wrong deployment" and "could not serialize".
///
/// Bodies use the same `{"error": <snake_case key>}` shape as the
/// coordinator's validation failures.
pub enum GatewayError {
    /// The request hit a role this deployment does not serve.
    RoleNotEnabled(&'static str),
    /// A check response failed to serialize.
    Serialization(serde_json::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_key) = match self {
            GatewayError::RoleNotEnabled(role) => {
                (StatusCode::NOT_FOUND, format!("{role}_role_not_enabled"))
            }
            GatewayError::Serialization(e) => {
                tracing::error!(target: "mpic-gateway", error = %e, "response serialization failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": error_key }))).into_response()
    }
}

/// The roles this process serves, built once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Present when the `[coordinator]` role is configured.
    pub coordinator: Option<Arc<MpicCoordinator>>,
    /// Present when the `[perspective]` role is configured.
    pub caa_checker: Option<Arc<MpicCaaChecker>>,
}

/// Builds the role-appropriate router.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new();
    if state.coordinator.is_some() {
        router = router.route("/mpic", post(mpic_handler));
    }
    if state.caa_checker.is_some() {
        router = router.route("/caa-check", post(caa_check_handler));
    }
    router
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn envelope_to_response(envelope: ApiResponse) -> Response {
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, envelope.headers.content_type)],
        envelope.body,
    )
        .into_response()
}

async fn mpic_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
    let _timer = RouteTimer::new(gateway_metrics(), "/mpic");
    let Some(coordinator) = &state.coordinator else {
        return GatewayError::RoleNotEnabled("coordinator").into_response();
    };
    let envelope = coordinator.coordinate_mpic(&body).await;
    gateway_metrics().inc_requests_total("/mpic", envelope.status_code);
    envelope_to_response(envelope)
}

async fn caa_check_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CaaCheckRequest>,
) -> Response {
    let _timer = RouteTimer::new(gateway_metrics(), "/caa-check");
    let Some(checker) = &state.caa_checker else {
        return GatewayError::RoleNotEnabled("perspective").into_response();
    };
    let check_response = checker.check_caa(&request).await;
    match serde_json::to_string(&check_response) {
        Ok(body) => {
            // The check outcome, passing or not, is always a 200 payload.
            gateway_metrics().inc_requests_total("/caa-check", 200);
            envelope_to_response(ApiResponse::ok(body))
        }
        Err(e) => GatewayError::Serialization(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use mpic_test_utils::remote::ScriptedRemote;
    use mpic_test_utils::requests::{to_body, valid_caa_mpic_request};
    use mpic_types::config::CoordinatorConfig;
    use tower::ServiceExt;

    fn coordinator_state() -> AppState {
        let config = CoordinatorConfig {
            known_perspectives: vec![
                "arin.us-east-1".to_string(),
                "arin.us-west-1".to_string(),
                "ripe.eu-west-2".to_string(),
                "ripe.eu-central-2".to_string(),
                "apnic.ap-northeast-1".to_string(),
                "apnic.ap-south-2".to_string(),
            ],
            default_perspective_count: 6,
            enforce_distinct_rir_regions: true,
            global_max_attempts: None,
            hash_secret: "test_secret".to_string(),
        };
        let coordinator =
            MpicCoordinator::new(Arc::new(ScriptedRemote::passing()), config).unwrap();
        AppState {
            coordinator: Some(Arc::new(coordinator)),
            caa_checker: None,
        }
    }

    #[tokio::test]
    async fn mpic_route_returns_the_coordination_envelope() {
        let app = router(coordinator_state());
        let request = Request::builder()
            .method("POST")
            .uri("/mpic")
            .header("content-type", "application/json")
            .body(Body::from(to_body(&valid_caa_mpic_request())))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["check_type"], "caa");
        assert_eq!(body["is_valid"], true);
    }

    #[tokio::test]
    async fn validation_failures_surface_as_400() {
        let app = router(coordinator_state());
        let request = Request::builder()
            .method("POST")
            .uri("/mpic")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"check_type": "caa"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn disabled_roles_are_not_routed() {
        let app = router(coordinator_state());
        let request = Request::builder()
            .method("POST")
            .uri("/caa-check")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
