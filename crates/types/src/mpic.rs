// Path: crates/types/src/mpic.rs
//! Aggregate MPIC request and response unions, orchestration parameters, and
//! the `{statusCode, headers, body}` envelope the coordinator emits.

use crate::check::{CaaCheckParameters, CheckType, DcvCheckParameters};
use crate::error::ValidationIssue;
use crate::response::CheckResponse;
use serde::{Deserialize, Serialize};

/// Client-supplied orchestration knobs. All fields are optional; absent
/// fields fall back to coordinator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpicRequestOrchestrationParameters {
    /// How many perspectives to corroborate across per attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_count: Option<u32>,
    /// How many passing perspectives are required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum_count: Option<u32>,
    /// Upper bound on attempts across alternative cohorts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Diagnostic-only: named perspectives that replace cohort selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspectives: Option<Vec<String>>,
}

/// The fully-resolved orchestration parameters reported back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpicEffectiveOrchestrationParameters {
    /// The perspective count each attempt used.
    pub perspective_count: u32,
    /// The quorum each attempt was evaluated against.
    pub quorum_count: u32,
    /// The number of the attempt whose responses are reported (1-based).
    pub attempt_count: u32,
}

/// An MPIC request asking for CAA corroboration only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpicCaaRequest {
    /// The domain or IP the corroboration targets.
    pub domain_or_ip_target: String,
    /// Optional orchestration overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestration_parameters: Option<MpicRequestOrchestrationParameters>,
    /// Optional CAA parameters forwarded to every perspective.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caa_check_parameters: Option<CaaCheckParameters>,
}

/// An MPIC request asking for DCV corroboration only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpicDcvRequest {
    /// The domain or IP the corroboration targets.
    pub domain_or_ip_target: String,
    /// Optional orchestration overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestration_parameters: Option<MpicRequestOrchestrationParameters>,
    /// DCV parameters forwarded to every perspective.
    pub dcv_check_parameters: DcvCheckParameters,
}

/// A combined request; the CAA and DCV quorums are evaluated independently
/// and issuance is corroborated only when both hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpicDcvWithCaaRequest {
    /// The domain or IP the corroboration targets.
    pub domain_or_ip_target: String,
    /// Optional orchestration overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestration_parameters: Option<MpicRequestOrchestrationParameters>,
    /// Optional CAA parameters forwarded to every perspective.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caa_check_parameters: Option<CaaCheckParameters>,
    /// DCV parameters forwarded to every perspective.
    pub dcv_check_parameters: DcvCheckParameters,
}

/// The inbound MPIC request union, tagged by `check_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check_type")]
pub enum MpicRequest {
    /// CAA-only corroboration.
    #[serde(rename = "caa")]
    Caa(MpicCaaRequest),
    /// DCV-only corroboration.
    #[serde(rename = "dcv")]
    Dcv(MpicDcvRequest),
    /// Combined CAA + DCV corroboration.
    #[serde(rename = "dcv_with_caa")]
    DcvWithCaa(MpicDcvWithCaaRequest),
}

impl MpicRequest {
    /// The request's check type discriminator.
    pub fn check_type(&self) -> CheckType {
        match self {
            MpicRequest::Caa(_) => CheckType::Caa,
            MpicRequest::Dcv(_) => CheckType::Dcv,
            MpicRequest::DcvWithCaa(_) => CheckType::DcvWithCaa,
        }
    }

    /// The domain or IP the corroboration targets.
    pub fn domain_or_ip_target(&self) -> &str {
        match self {
            MpicRequest::Caa(r) => &r.domain_or_ip_target,
            MpicRequest::Dcv(r) => &r.domain_or_ip_target,
            MpicRequest::DcvWithCaa(r) => &r.domain_or_ip_target,
        }
    }

    /// The client's orchestration overrides, if any.
    pub fn orchestration_parameters(&self) -> Option<&MpicRequestOrchestrationParameters> {
        match self {
            MpicRequest::Caa(r) => r.orchestration_parameters.as_ref(),
            MpicRequest::Dcv(r) => r.orchestration_parameters.as_ref(),
            MpicRequest::DcvWithCaa(r) => r.orchestration_parameters.as_ref(),
        }
    }
}

/// A single-check-type aggregate response (CAA-only or DCV-only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpicSingleCheckResponse {
    /// Whether the final attempt satisfied the quorum.
    pub is_valid: bool,
    /// The final attempt's per-perspective verdicts, sorted by code.
    pub perspectives: Vec<CheckResponse>,
    /// The orchestration parameters that were actually in effect.
    pub actual_orchestration_parameters: MpicEffectiveOrchestrationParameters,
}

/// The aggregate response for a combined CAA + DCV corroboration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpicDcvWithCaaResponse {
    /// Whether the final attempt satisfied the CAA quorum.
    pub is_valid_caa: bool,
    /// Whether the final attempt satisfied the DCV quorum.
    pub is_valid_dcv: bool,
    /// `is_valid_caa && is_valid_dcv`.
    pub is_valid: bool,
    /// The final attempt's CAA verdicts, sorted by code.
    pub perspectives_caa: Vec<CheckResponse>,
    /// The final attempt's DCV verdicts, sorted by code.
    pub perspectives_dcv: Vec<CheckResponse>,
    /// The orchestration parameters that were actually in effect.
    pub actual_orchestration_parameters: MpicEffectiveOrchestrationParameters,
}

/// The outbound MPIC response union, tagged by `check_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check_type")]
pub enum MpicResponse {
    /// CAA-only corroboration outcome.
    #[serde(rename = "caa")]
    Caa(MpicSingleCheckResponse),
    /// DCV-only corroboration outcome.
    #[serde(rename = "dcv")]
    Dcv(MpicSingleCheckResponse),
    /// Combined corroboration outcome.
    #[serde(rename = "dcv_with_caa")]
    DcvWithCaa(MpicDcvWithCaaResponse),
}

impl MpicResponse {
    /// The overall verdict, independent of check type.
    pub fn is_valid(&self) -> bool {
        match self {
            MpicResponse::Caa(r) | MpicResponse::Dcv(r) => r.is_valid,
            MpicResponse::DcvWithCaa(r) => r.is_valid,
        }
    }
}

/// The body of a `400` envelope describing why validation failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpicRequestValidationError {
    /// Always `request_validation_failed`.
    pub error: String,
    /// The stable issue keys, in the order they were discovered.
    pub validation_issues: Vec<serde_json::Value>,
}

impl MpicRequestValidationError {
    /// Builds the standard validation failure body from issue keys.
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        MpicRequestValidationError {
            error: "request_validation_failed".to_string(),
            validation_issues: issues
                .iter()
                .map(|i| serde_json::to_value(i).unwrap_or_default())
                .collect(),
        }
    }
}

/// Response headers carried in the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponseHeaders {
    /// Always `application/json`.
    #[serde(rename = "Content-Type")]
    pub content_type: String,
}

impl Default for ApiResponseHeaders {
    fn default() -> Self {
        ApiResponseHeaders {
            content_type: "application/json".to_string(),
        }
    }
}

/// The `{statusCode, headers, body}` envelope every coordinator invocation
/// resolves to. A failed corroboration is a valid `200` payload; only
/// request validation failures use `400`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP-style status code: `200` or `400`.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Response headers.
    pub headers: ApiResponseHeaders,
    /// Stringified JSON body.
    pub body: String,
}

impl ApiResponse {
    /// A `200` envelope around an already-serialized body.
    pub fn ok(body: String) -> Self {
        ApiResponse {
            status_code: 200,
            headers: ApiResponseHeaders::default(),
            body,
        }
    }

    /// A `400` envelope around an already-serialized body.
    pub fn bad_request(body: String) -> Self {
        ApiResponse {
            status_code: 400,
            headers: ApiResponseHeaders::default(),
            body,
        }
    }
}
