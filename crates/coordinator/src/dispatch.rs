// Path: crates/coordinator/src/dispatch.rs
//! Parallel fan-out of one attempt's remote check calls.

use async_trait::async_trait;
use futures_util::future::join_all;
use mpic_telemetry::coordinator_metrics;
use mpic_types::check::{CaaCheckRequest, CheckRequest, CheckType, DcvCheckRequest};
use mpic_types::error::RemoteCallError;
use mpic_types::mpic::MpicRequest;
use mpic_types::perspective::RemotePerspective;
use mpic_types::response::CheckResponse;
use tracing::warn;

/// The dependency through which the coordinator reaches remote perspectives.
///
/// Implementations return the perspective's serialized `CheckResponse`; any
/// transport or protocol failure is an `Err`, which the dispatcher converts
/// into a synthetic failed response rather than aborting the attempt.
/// Timeouts, if any, are the implementation's responsibility.
#[async_trait]
pub trait RemotePerspectiveCall: Send + Sync {
    /// Performs one check at one remote perspective.
    async fn call_remote_perspective(
        &self,
        perspective: &RemotePerspective,
        check_type: CheckType,
        check_request: &CheckRequest,
    ) -> Result<String, RemoteCallError>;
}

/// One remote call the dispatcher will issue.
#[derive(Debug, Clone)]
pub(crate) struct RemoteCheckCall {
    pub perspective: RemotePerspective,
    pub check_type: CheckType,
    pub check_request: CheckRequest,
}

/// Expands an MPIC request into the call list for one cohort: one call per
/// perspective, or two (CAA and DCV) for a combined request.
pub(crate) fn collect_calls_to_issue(
    request: &MpicRequest,
    cohort: &[RemotePerspective],
) -> Vec<RemoteCheckCall> {
    let mut calls = Vec::new();
    for perspective in cohort {
        match request {
            MpicRequest::Caa(r) => calls.push(RemoteCheckCall {
                perspective: perspective.clone(),
                check_type: CheckType::Caa,
                check_request: CheckRequest::Caa(CaaCheckRequest {
                    domain_or_ip_target: r.domain_or_ip_target.clone(),
                    caa_check_parameters: r.caa_check_parameters.clone(),
                }),
            }),
            MpicRequest::Dcv(r) => calls.push(RemoteCheckCall {
                perspective: perspective.clone(),
                check_type: CheckType::Dcv,
                check_request: CheckRequest::Dcv(DcvCheckRequest {
                    domain_or_ip_target: r.domain_or_ip_target.clone(),
                    dcv_check_parameters: r.dcv_check_parameters.clone(),
                }),
            }),
            MpicRequest::DcvWithCaa(r) => {
                calls.push(RemoteCheckCall {
                    perspective: perspective.clone(),
                    check_type: CheckType::Caa,
                    check_request: CheckRequest::Caa(CaaCheckRequest {
                        domain_or_ip_target: r.domain_or_ip_target.clone(),
                        caa_check_parameters: r.caa_check_parameters.clone(),
                    }),
                });
                calls.push(RemoteCheckCall {
                    perspective: perspective.clone(),
                    check_type: CheckType::Dcv,
                    check_request: CheckRequest::Dcv(DcvCheckRequest {
                        domain_or_ip_target: r.domain_or_ip_target.clone(),
                        dcv_check_parameters: r.dcv_check_parameters.clone(),
                    }),
                });
            }
        }
    }
    calls
}

/// Issues every call concurrently and waits for all of them.
///
/// A call that errors, or answers with something that does not parse as a
/// `CheckResponse`, is recorded as a failed response carrying
/// `COORDINATOR_COMMUNICATION_ERROR`; the attempt's quorum is then evaluated
/// over the full response set. The per-check-type tag is preserved so a
/// combined request's legs can be split apart afterwards.
pub(crate) async fn dispatch_calls(
    caller: &dyn RemotePerspectiveCall,
    calls: &[RemoteCheckCall],
) -> Vec<(CheckType, CheckResponse)> {
    let futures = calls.iter().map(|call| async move {
        let outcome = caller
            .call_remote_perspective(&call.perspective, call.check_type, &call.check_request)
            .await
            .and_then(|serialized| {
                serde_json::from_str::<CheckResponse>(&serialized)
                    .map_err(|e| RemoteCallError::MalformedResponse(e.to_string()))
            });
        let response = match outcome {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    target: "mpic-coordinator",
                    perspective = %call.perspective,
                    check_type = %call.check_type,
                    error = %error,
                    "remote perspective call failed"
                );
                coordinator_metrics().inc_remote_call_failures(&call.perspective.to_rir_code());
                CheckResponse::communication_failure(
                    call.perspective.to_rir_code(),
                    call.check_type,
                    &error,
                )
            }
        };
        (call.check_type, response)
    });
    join_all(futures).await
}
