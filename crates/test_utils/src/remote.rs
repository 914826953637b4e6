// Path: crates/test_utils/src/remote.rs
//! Scripted [`RemotePerspectiveCall`] doubles.
//!
//! A script is consumed one entry per remote call, cycling when exhausted,
//! which lets a test stage sequences like "fail the first cohort, pass the
//! second" the same way the coordinator will consume them.

use async_trait::async_trait;
use mpic_coordinator::RemotePerspectiveCall;
use mpic_types::check::{CheckRequest, CheckType};
use mpic_types::error::RemoteCallError;
use mpic_types::perspective::RemotePerspective;
use mpic_types::response::{
    now_timestamp_ns, CaaCheckResponseDetails, CheckResponse, CheckResponseDetails,
    DcvCheckResponseDetails,
};
use std::sync::Mutex;

/// What one scripted remote call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// Answer with a passing check response.
    Pass,
    /// Answer with a failing check response.
    Fail,
    /// Raise a transport error instead of answering.
    Error,
}

/// One observed remote call, for asserting on dispatch behavior.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The `<rir>.<code>` wire code of the called perspective.
    pub perspective_code: String,
    /// The check type the dispatcher tagged the call with.
    pub check_type: CheckType,
    /// The target forwarded in the check request.
    pub domain_or_ip_target: String,
}

enum Script {
    Cycle { outcomes: Vec<RemoteOutcome>, next: usize },
    ByCheckType { caa: RemoteOutcome, dcv: RemoteOutcome },
}

/// A scripted remote-perspective transport.
pub struct ScriptedRemote {
    script: Mutex<Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRemote {
    /// Every call follows `outcomes` in order, cycling when exhausted.
    pub fn cycle(outcomes: Vec<RemoteOutcome>) -> Self {
        Self {
            script: Mutex::new(Script::Cycle { outcomes, next: 0 }),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds.
    pub fn passing() -> Self {
        Self::cycle(vec![RemoteOutcome::Pass])
    }

    /// Every call answers with a failing check.
    pub fn failing() -> Self {
        Self::cycle(vec![RemoteOutcome::Fail])
    }

    /// Every call raises a transport error.
    pub fn erroring() -> Self {
        Self::cycle(vec![RemoteOutcome::Error])
    }

    /// CAA calls follow one outcome, DCV calls another.
    pub fn by_check_type(caa: RemoteOutcome, dcv: RemoteOutcome) -> Self {
        Self {
            script: Mutex::new(Script::ByCheckType { caa, dcv }),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call the coordinator has issued so far.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("call log lock").clone()
    }

    fn next_outcome(&self, check_type: CheckType) -> RemoteOutcome {
        let mut script = self.script.lock().expect("script lock");
        match &mut *script {
            Script::Cycle { outcomes, next } => {
                let outcome = outcomes[*next % outcomes.len()];
                *next += 1;
                outcome
            }
            Script::ByCheckType { caa, dcv } => match check_type {
                CheckType::Caa => *caa,
                _ => *dcv,
            },
        }
    }
}

#[async_trait]
impl RemotePerspectiveCall for ScriptedRemote {
    async fn call_remote_perspective(
        &self,
        perspective: &RemotePerspective,
        check_type: CheckType,
        check_request: &CheckRequest,
    ) -> Result<String, RemoteCallError> {
        self.calls.lock().expect("call log lock").push(RecordedCall {
            perspective_code: perspective.to_rir_code(),
            check_type,
            domain_or_ip_target: check_request.domain_or_ip_target().to_string(),
        });
        match self.next_outcome(check_type) {
            RemoteOutcome::Pass => Ok(serialize(passing_check_response(
                &perspective.to_rir_code(),
                check_type,
            ))),
            RemoteOutcome::Fail => Ok(serialize(failing_check_response(
                &perspective.to_rir_code(),
                check_type,
            ))),
            RemoteOutcome::Error => Err(RemoteCallError::Transport(
                "scripted remote failure".to_string(),
            )),
        }
    }
}

fn serialize(response: CheckResponse) -> String {
    serde_json::to_string(&response).expect("check response serializes")
}

/// A passing check response, shaped for `check_type`.
pub fn passing_check_response(perspective_code: &str, check_type: CheckType) -> CheckResponse {
    CheckResponse {
        perspective_code: perspective_code.to_string(),
        check_passed: true,
        details: details_for(check_type, false),
        errors: None,
        timestamp_ns: now_timestamp_ns(),
    }
}

/// A failing check response, shaped for `check_type`.
pub fn failing_check_response(perspective_code: &str, check_type: CheckType) -> CheckResponse {
    CheckResponse {
        perspective_code: perspective_code.to_string(),
        check_passed: false,
        details: details_for(check_type, true),
        errors: None,
        timestamp_ns: now_timestamp_ns(),
    }
}

fn details_for(check_type: CheckType, caa_record_present: bool) -> CheckResponseDetails {
    match check_type {
        CheckType::Caa => CheckResponseDetails::Caa(CaaCheckResponseDetails {
            caa_record_present,
            found_at: None,
            response_text: None,
        }),
        _ => CheckResponseDetails::Dcv(DcvCheckResponseDetails::default()),
    }
}
