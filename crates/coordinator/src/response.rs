// Path: crates/coordinator/src/response.rs
//! Assembles the typed aggregate response from the final attempt's verdicts.

use mpic_types::check::CheckType;
use mpic_types::mpic::{
    MpicDcvWithCaaResponse, MpicEffectiveOrchestrationParameters, MpicResponse,
    MpicSingleCheckResponse,
};
use mpic_types::response::CheckResponse;

/// The final attempt's collected verdicts and per-check-type outcomes.
#[derive(Debug)]
pub(crate) struct AttemptOutcome {
    pub attempt_count: u32,
    pub caa_responses: Vec<CheckResponse>,
    pub dcv_responses: Vec<CheckResponse>,
    pub caa_valid: Option<bool>,
    pub dcv_valid: Option<bool>,
}

impl AttemptOutcome {
    /// Whether every check type present in this attempt met its quorum.
    pub fn succeeded(&self) -> bool {
        self.caa_valid.unwrap_or(true) && self.dcv_valid.unwrap_or(true)
    }
}

/// Builds the `check_type`-tagged aggregate response. Perspective lists are
/// sorted by wire code so identical outcomes serialize identically.
pub(crate) fn assemble_response(
    check_type: CheckType,
    outcome: AttemptOutcome,
    perspective_count: u32,
    quorum_count: u32,
) -> MpicResponse {
    let actual_orchestration_parameters = MpicEffectiveOrchestrationParameters {
        perspective_count,
        quorum_count,
        attempt_count: outcome.attempt_count,
    };
    match check_type {
        CheckType::Caa => MpicResponse::Caa(MpicSingleCheckResponse {
            is_valid: outcome.caa_valid.unwrap_or(false),
            perspectives: sorted_by_code(outcome.caa_responses),
            actual_orchestration_parameters,
        }),
        CheckType::Dcv => MpicResponse::Dcv(MpicSingleCheckResponse {
            is_valid: outcome.dcv_valid.unwrap_or(false),
            perspectives: sorted_by_code(outcome.dcv_responses),
            actual_orchestration_parameters,
        }),
        CheckType::DcvWithCaa => {
            let is_valid_caa = outcome.caa_valid.unwrap_or(false);
            let is_valid_dcv = outcome.dcv_valid.unwrap_or(false);
            MpicResponse::DcvWithCaa(MpicDcvWithCaaResponse {
                is_valid_caa,
                is_valid_dcv,
                is_valid: is_valid_caa && is_valid_dcv,
                perspectives_caa: sorted_by_code(outcome.caa_responses),
                perspectives_dcv: sorted_by_code(outcome.dcv_responses),
                actual_orchestration_parameters,
            })
        }
    }
}

fn sorted_by_code(mut responses: Vec<CheckResponse>) -> Vec<CheckResponse> {
    responses.sort_by(|a, b| a.perspective_code.cmp(&b.perspective_code));
    responses
}
