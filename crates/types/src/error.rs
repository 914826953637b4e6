// Path: crates/types/src/error.rs
//! Core error types for the MPIC workspace.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised while building a coordinator or checker from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A perspective wire code carried an RIR tag outside the known registries.
    #[error("Unknown RIR prefix: {0}")]
    UnknownRir(String),
    /// A perspective wire code did not match the `<rir>.<code>` form.
    #[error("Malformed perspective code: {0}")]
    MalformedPerspective(String),
    /// The same perspective code was listed twice.
    #[error("Duplicate perspective code: {0}")]
    DuplicatePerspective(String),
    /// The configured perspective set was empty.
    #[error("The known perspective set must not be empty")]
    EmptyPerspectiveSet,
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownRir(_) => "CONFIG_UNKNOWN_RIR",
            Self::MalformedPerspective(_) => "CONFIG_MALFORMED_PERSPECTIVE",
            Self::DuplicatePerspective(_) => "CONFIG_DUPLICATE_PERSPECTIVE",
            Self::EmptyPerspectiveSet => "CONFIG_EMPTY_PERSPECTIVE_SET",
        }
    }
}

/// Errors raised while constructing cohorts for an attempt sequence.
#[derive(Debug, Error)]
pub enum CohortError {
    /// The requested cohort size exceeds the number of known perspectives.
    #[error("Requested cohort size {requested} exceeds the {available} known perspectives")]
    SizeExceedsPerspectives {
        /// The cohort size the request asked for.
        requested: usize,
        /// How many perspectives the registry holds.
        available: usize,
    },
    /// A cohort size of zero can never satisfy any quorum.
    #[error("Cohort size must be at least 1")]
    EmptyCohort,
}

impl ErrorCode for CohortError {
    fn code(&self) -> &'static str {
        match self {
            Self::SizeExceedsPerspectives { .. } => "COHORT_SIZE_EXCEEDS_PERSPECTIVES",
            Self::EmptyCohort => "COHORT_EMPTY",
        }
    }
}

/// Failures observed when calling out to a remote perspective.
///
/// Every variant maps to the single stable wire code
/// `COORDINATOR_COMMUNICATION_ERROR`: from the client's point of view the
/// coordinator could not obtain a usable verdict from that perspective,
/// whatever the transport-level cause.
#[derive(Debug, Error)]
pub enum RemoteCallError {
    /// The call could not be completed (connect failure, timeout, ...).
    #[error("Remote perspective call failed: {0}")]
    Transport(String),
    /// The remote answered with a non-success status.
    #[error("Remote perspective returned status {0}")]
    Status(u16),
    /// The remote answered, but the payload was not a valid check response.
    #[error("Malformed check response from remote perspective: {0}")]
    MalformedResponse(String),
}

impl ErrorCode for RemoteCallError {
    fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) | Self::Status(_) | Self::MalformedResponse(_) => {
                "COORDINATOR_COMMUNICATION_ERROR"
            }
        }
    }
}

/// Errors raised inside the CAA checker.
#[derive(Debug, Error)]
pub enum CaaCheckError {
    /// A DNS lookup failed for a reason other than an absent RRset.
    #[error("CAA lookup failed for {domain}: {reason}")]
    Lookup {
        /// The name whose lookup failed.
        domain: String,
        /// The resolver's description of the failure.
        reason: String,
    },
}

impl ErrorCode for CaaCheckError {
    fn code(&self) -> &'static str {
        match self {
            Self::Lookup { .. } => "CAA_LOOKUP_ERROR",
        }
    }
}

/// The stable issue keys reported under `validation_issues` in a
/// `request_validation_failed` response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The body was not parseable JSON, or did not match the request schema.
    MalformedRequestBody,
    /// `check_type` was missing or not one of `caa | dcv | dcv_with_caa`.
    InvalidCheckType,
    /// `domain_or_ip_target` was missing or empty.
    MissingDomainOrIpTarget,
    /// `perspective_count` was zero or exceeded the known perspective set.
    InvalidPerspectiveCount,
    /// `quorum_count` was zero or exceeded `perspective_count`.
    InvalidQuorumCount,
    /// No `quorum_count` was given and no floor is defined for the count.
    QuorumCountRequired,
    /// The diagnostic `perspectives` override named an unknown perspective.
    InvalidPerspectives,
}

impl ErrorCode for ValidationIssue {
    fn code(&self) -> &'static str {
        match self {
            Self::MalformedRequestBody => "malformed_request_body",
            Self::InvalidCheckType => "invalid_check_type",
            Self::MissingDomainOrIpTarget => "missing_domain_or_ip_target",
            Self::InvalidPerspectiveCount => "invalid_perspective_count",
            Self::InvalidQuorumCount => "invalid_quorum_count",
            Self::QuorumCountRequired => "quorum_count_required",
            Self::InvalidPerspectives => "invalid_perspectives",
        }
    }
}

impl Serialize for ValidationIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_call_errors_share_one_wire_code() {
        for err in [
            RemoteCallError::Transport("refused".to_string()),
            RemoteCallError::Status(502),
            RemoteCallError::MalformedResponse("not json".to_string()),
        ] {
            assert_eq!(err.code(), "COORDINATOR_COMMUNICATION_ERROR");
        }
    }

    #[test]
    fn validation_issues_serialize_as_keys() {
        let json = serde_json::to_string(&ValidationIssue::MissingDomainOrIpTarget).unwrap();
        assert_eq!(json, r#""missing_domain_or_ip_target""#);
    }
}
