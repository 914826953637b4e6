// Path: crates/types/src/response.rs
//! Check-level response types: the verdict a single perspective reports back.

use crate::check::CheckType;
use crate::error::{ErrorCode, RemoteCallError};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch, for `CheckResponse::timestamp_ns`.
pub fn now_timestamp_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// A structured error entry attached to a failed check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckError {
    /// Stable machine-readable code, e.g. `COORDINATOR_COMMUNICATION_ERROR`.
    pub error_type: String,
    /// Human-readable description of the failure.
    pub error_message: String,
}

/// CAA-specific response details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaCheckResponseDetails {
    /// Whether any ancestor of the target carried a CAA RRset.
    pub caa_record_present: bool,
    /// The ancestor domain where the RRset was located, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_at: Option<String>,
    /// Textual rendering of the located RRset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
}

/// DCV-specific response details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcvCheckResponseDetails {
    /// Raw evidence the perspective observed, e.g. the fetched record set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
}

/// Check-type-specific details carried inside a `CheckResponse`.
///
/// Serialized untagged: the surrounding response already states its check
/// type, and the CAA shape is distinguishable by `caa_record_present`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckResponseDetails {
    /// CAA lookup details.
    Caa(CaaCheckResponseDetails),
    /// DCV observation details.
    Dcv(DcvCheckResponseDetails),
}

impl CheckResponseDetails {
    /// An empty details object of the right shape for `check_type`.
    pub fn empty_for(check_type: CheckType) -> Self {
        match check_type {
            CheckType::Caa => CheckResponseDetails::Caa(CaaCheckResponseDetails::default()),
            // A combined request never reaches a single perspective; each leg
            // is dispatched as a plain CAA or DCV call.
            CheckType::Dcv | CheckType::DcvWithCaa => {
                CheckResponseDetails::Dcv(DcvCheckResponseDetails::default())
            }
        }
    }
}

/// The verdict one perspective reports for one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    /// The `<rir>.<code>` wire form of the responding perspective.
    pub perspective_code: String,
    /// Whether the check passed from this perspective's vantage point.
    pub check_passed: bool,
    /// Check-type-specific details.
    pub details: CheckResponseDetails,
    /// Errors observed while producing this verdict, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<CheckError>>,
    /// Nanoseconds since the Unix epoch at which the verdict was produced.
    pub timestamp_ns: u64,
}

impl CheckResponse {
    /// The synthetic failed response the dispatcher records when a remote
    /// call raises instead of answering.
    pub fn communication_failure(
        perspective_code: String,
        check_type: CheckType,
        error: &RemoteCallError,
    ) -> Self {
        CheckResponse {
            perspective_code,
            check_passed: false,
            details: CheckResponseDetails::empty_for(check_type),
            errors: Some(vec![CheckError {
                error_type: error.code().to_string(),
                error_message: error.to_string(),
            }]),
            timestamp_ns: now_timestamp_ns(),
        }
    }
}
