// Path: crates/coordinator/src/lib.rs
#![forbid(unsafe_code)]

//! # MPIC Coordinator
//!
//! The orchestration engine for multi-perspective issuance corroboration:
//! validates a client request, partitions the known perspectives into
//! deterministic cohorts, fans each attempt out to a cohort of remote
//! perspectives in parallel, evaluates the quorum, and cycles through
//! alternative cohorts up to a bounded number of attempts.
//!
//! Everything here is per-request; the coordinator holds no mutable state
//! and a single instance serves concurrent coordinations.

pub mod cohorts;
pub mod dispatch;
pub mod quorum;
pub mod registry;
mod response;

pub use dispatch::RemotePerspectiveCall;
pub use registry::PerspectiveRegistry;

use mpic_telemetry::coordinator_metrics;
use mpic_types::check::CheckType;
use mpic_types::config::CoordinatorConfig;
use mpic_types::error::{CohortError, ConfigError, ValidationIssue};
use mpic_types::mpic::{ApiResponse, MpicRequest, MpicRequestValidationError};
use mpic_types::perspective::RemotePerspective;
use response::AttemptOutcome;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The fully-resolved request an attempt loop runs against.
struct ValidatedRequest {
    request: MpicRequest,
    perspective_count: u32,
    quorum_count: u32,
    max_attempts: u32,
    cohorts: Vec<Vec<RemotePerspective>>,
}

/// The multi-perspective corroboration engine.
///
/// Construction fixes the perspective registry, the cohort-shuffling secret,
/// and the orchestration defaults; the remote transport is injected as a
/// [`RemotePerspectiveCall`] so tests can drive the engine without a network.
pub struct MpicCoordinator {
    call_remote_perspective: Arc<dyn RemotePerspectiveCall>,
    registry: PerspectiveRegistry,
    default_perspective_count: u32,
    enforce_distinct_rir_regions: bool,
    global_max_attempts: Option<u32>,
    hash_secret: String,
}

impl MpicCoordinator {
    /// Builds a coordinator from its transport and configuration.
    pub fn new(
        call_remote_perspective: Arc<dyn RemotePerspectiveCall>,
        config: CoordinatorConfig,
    ) -> Result<Self, ConfigError> {
        let registry = PerspectiveRegistry::from_wire_codes(&config.known_perspectives)?;
        Ok(Self {
            call_remote_perspective,
            registry,
            default_perspective_count: config.default_perspective_count,
            enforce_distinct_rir_regions: config.enforce_distinct_rir_regions,
            global_max_attempts: config.global_max_attempts,
            hash_secret: config.hash_secret,
        })
    }

    /// The perspectives this coordinator selects cohorts from.
    pub fn registry(&self) -> &PerspectiveRegistry {
        &self.registry
    }

    /// The hard cap applied over request-supplied `max_attempts`, if any.
    pub fn global_max_attempts(&self) -> Option<u32> {
        self.global_max_attempts
    }

    /// The disjoint cohort sequence for `target` at `cohort_size`. Exposed
    /// for diagnostics; `coordinate_mpic` calls it internally.
    pub fn build_cohorts(
        &self,
        target: &str,
        cohort_size: usize,
    ) -> Result<Vec<Vec<RemotePerspective>>, CohortError> {
        cohorts::build_cohorts(
            &self.registry,
            self.hash_secret.as_bytes(),
            target,
            cohort_size,
            self.enforce_distinct_rir_regions,
        )
    }

    /// Runs one full corroboration for a JSON request body.
    ///
    /// Every code path resolves to a `{statusCode, headers, body}` envelope:
    /// `400` for request validation failures, otherwise `200`. A failed
    /// corroboration is a valid response payload, not an error.
    pub async fn coordinate_mpic(&self, body: &str) -> ApiResponse {
        let validated = match self.parse_and_validate(body) {
            Ok(validated) => validated,
            Err(issues) => {
                warn!(target: "mpic-coordinator", issues = ?issues, "request validation failed");
                let error_body = MpicRequestValidationError::from_issues(&issues);
                let body = serde_json::to_string(&error_body)
                    .unwrap_or_else(|_| r#"{"error":"request_validation_failed"}"#.to_string());
                return ApiResponse::bad_request(body);
            }
        };

        let check_type = validated.request.check_type();
        let outcome = self.run_attempts(&validated).await;

        coordinator_metrics().inc_coordinations_total(
            check_type.as_str(),
            if outcome.succeeded() { "valid" } else { "invalid" },
        );
        coordinator_metrics().observe_attempts(f64::from(outcome.attempt_count));

        let response = response::assemble_response(
            check_type,
            outcome,
            validated.perspective_count,
            validated.quorum_count,
        );
        match serde_json::to_string(&response) {
            Ok(body) => ApiResponse::ok(body),
            Err(e) => {
                error!(target: "mpic-coordinator", error = %e, "failed to serialize response");
                ApiResponse {
                    status_code: 500,
                    headers: Default::default(),
                    body: r#"{"error":"internal_error"}"#.to_string(),
                }
            }
        }
    }

    /// Drives sequential attempts through the cohort cycle until a quorum is
    /// met or attempts are exhausted; only the final attempt's responses are
    /// kept.
    async fn run_attempts(&self, validated: &ValidatedRequest) -> AttemptOutcome {
        let check_type = validated.request.check_type();
        let cohort_count = validated.cohorts.len();
        let mut attempt = 1u32;
        loop {
            // Stable cycling: attempts k and k + cohort_count reuse a cohort.
            let cohort = &validated.cohorts[(attempt as usize - 1) % cohort_count];
            debug!(
                target: "mpic-coordinator",
                attempt,
                cohort = ?cohort.iter().map(RemotePerspective::to_rir_code).collect::<Vec<_>>(),
                "dispatching attempt"
            );

            let calls = dispatch::collect_calls_to_issue(&validated.request, cohort);
            let started = Instant::now();
            let tagged =
                dispatch::dispatch_calls(self.call_remote_perspective.as_ref(), &calls).await;
            coordinator_metrics()
                .observe_dispatch_duration(check_type.as_str(), started.elapsed().as_secs_f64());

            let mut caa_responses = Vec::new();
            let mut dcv_responses = Vec::new();
            for (call_type, response) in tagged {
                match call_type {
                    CheckType::Caa => caa_responses.push(response),
                    CheckType::Dcv | CheckType::DcvWithCaa => dcv_responses.push(response),
                }
            }
            let caa_valid = (!caa_responses.is_empty())
                .then(|| quorum::evaluate(&caa_responses, validated.quorum_count));
            let dcv_valid = (!dcv_responses.is_empty())
                .then(|| quorum::evaluate(&dcv_responses, validated.quorum_count));

            let outcome = AttemptOutcome {
                attempt_count: attempt,
                caa_responses,
                dcv_responses,
                caa_valid,
                dcv_valid,
            };
            if outcome.succeeded() {
                info!(target: "mpic-coordinator", attempt, "quorum satisfied");
                return outcome;
            }
            if attempt >= validated.max_attempts {
                info!(
                    target: "mpic-coordinator",
                    attempt, "attempts exhausted without quorum"
                );
                return outcome;
            }
            debug!(target: "mpic-coordinator", attempt, "quorum not met, advancing cohort");
            attempt += 1;
        }
    }

    /// Parses the body and resolves the effective orchestration parameters,
    /// accumulating every validation issue found.
    fn parse_and_validate(&self, body: &str) -> Result<ValidatedRequest, Vec<ValidationIssue>> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|_| vec![ValidationIssue::MalformedRequestBody])?;

        let mut issues = Vec::new();
        match value.get("check_type").and_then(|v| v.as_str()) {
            Some("caa" | "dcv" | "dcv_with_caa") => {}
            _ => issues.push(ValidationIssue::InvalidCheckType),
        }
        let has_target = matches!(
            value.get("domain_or_ip_target").and_then(|v| v.as_str()),
            Some(target) if !target.is_empty()
        );
        if !has_target {
            issues.push(ValidationIssue::MissingDomainOrIpTarget);
        }
        if !issues.is_empty() {
            return Err(issues);
        }

        let request: MpicRequest = serde_json::from_value(value)
            .map_err(|_| vec![ValidationIssue::MalformedRequestBody])?;
        let params = request.orchestration_parameters();

        // Diagnostic override: the named perspectives bypass cohort
        // construction and form the sole cohort for every attempt.
        let override_cohort = match params.and_then(|p| p.perspectives.as_ref()) {
            Some(codes) => {
                let mut cohort = Vec::with_capacity(codes.len());
                let mut valid = !codes.is_empty();
                for code in codes {
                    match self.registry.get(code) {
                        Some(perspective) => cohort.push(perspective.clone()),
                        None => valid = false,
                    }
                }
                if !valid {
                    issues.push(ValidationIssue::InvalidPerspectives);
                    None
                } else {
                    Some(cohort)
                }
            }
            None => None,
        };

        let perspective_count = match &override_cohort {
            Some(cohort) => cohort.len() as u32,
            None => params
                .and_then(|p| p.perspective_count)
                .unwrap_or(self.default_perspective_count),
        };
        if perspective_count == 0 || perspective_count as usize > self.registry.len() {
            issues.push(ValidationIssue::InvalidPerspectiveCount);
        }

        let quorum_count = match params.and_then(|p| p.quorum_count) {
            Some(quorum) => {
                if quorum == 0 || quorum > perspective_count {
                    issues.push(ValidationIssue::InvalidQuorumCount);
                }
                quorum
            }
            None => match quorum::quorum_floor(perspective_count) {
                Some(quorum) => quorum,
                None => {
                    issues.push(ValidationIssue::QuorumCountRequired);
                    0
                }
            },
        };

        let requested_attempts = params.and_then(|p| p.max_attempts).unwrap_or(1).max(1);
        let max_attempts = match self.global_max_attempts {
            Some(cap) => requested_attempts.min(cap.max(1)),
            None => requested_attempts,
        };

        if !issues.is_empty() {
            return Err(issues);
        }

        let cohorts = match override_cohort {
            Some(cohort) => vec![cohort],
            None => self
                .build_cohorts(request.domain_or_ip_target(), perspective_count as usize)
                .map_err(|e| {
                    // Bounds were checked above, so only a registry/cohort
                    // mismatch can land here; surface it as the count issue.
                    warn!(target: "mpic-coordinator", error = %e, "cohort construction failed");
                    vec![ValidationIssue::InvalidPerspectiveCount]
                })?,
        };

        Ok(ValidatedRequest {
            request,
            perspective_count,
            quorum_count,
            max_attempts,
            cohorts,
        })
    }
}
