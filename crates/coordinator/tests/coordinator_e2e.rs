// Path: crates/coordinator/tests/coordinator_e2e.rs
//! End-to-end coordination scenarios driven through `coordinate_mpic` with
//! scripted remote-perspective transports.

use mpic_coordinator::MpicCoordinator;
use mpic_test_utils::remote::{RemoteOutcome, ScriptedRemote};
use mpic_test_utils::requests::{
    to_body, valid_caa_mpic_request, valid_dcv_mpic_request, valid_dcv_with_caa_mpic_request,
    with_orchestration,
};
use mpic_types::config::CoordinatorConfig;
use mpic_types::mpic::{
    ApiResponse, MpicDcvWithCaaResponse, MpicRequestOrchestrationParameters, MpicResponse,
    MpicSingleCheckResponse,
};
use std::sync::Arc;

fn coordinator_config() -> CoordinatorConfig {
    CoordinatorConfig {
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
    }
}

fn coordinator(remote: ScriptedRemote) -> MpicCoordinator {
    MpicCoordinator::new(Arc::new(remote), coordinator_config()).expect("valid test config")
}

fn orchestration(
    perspective_count: u32,
    quorum_count: u32,
    max_attempts: u32,
) -> MpicRequestOrchestrationParameters {
    MpicRequestOrchestrationParameters {
        perspective_count: Some(perspective_count),
        quorum_count: Some(quorum_count),
        max_attempts: Some(max_attempts),
        perspectives: None,
    }
}

fn single_response(envelope: &ApiResponse) -> MpicSingleCheckResponse {
    match serde_json::from_str::<MpicResponse>(&envelope.body).expect("parseable body") {
        MpicResponse::Caa(r) | MpicResponse::Dcv(r) => r,
        MpicResponse::DcvWithCaa(_) => panic!("expected a single-check response"),
    }
}

fn combined_response(envelope: &ApiResponse) -> MpicDcvWithCaaResponse {
    match serde_json::from_str::<MpicResponse>(&envelope.body).expect("parseable body") {
        MpicResponse::DcvWithCaa(r) => r,
        _ => panic!("expected a combined response"),
    }
}

fn validation_issues(envelope: &ApiResponse) -> Vec<String> {
    let body: serde_json::Value = serde_json::from_str(&envelope.body).expect("parseable body");
    assert_eq!(body["error"], "request_validation_failed");
    body["validation_issues"]
        .as_array()
        .expect("issue list")
        .iter()
        .map(|v| v.as_str().expect("issue key").to_string())
        .collect()
}

#[tokio::test]
async fn successful_caa_corroboration_reports_all_perspectives() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let envelope = coordinator
        .coordinate_mpic(&to_body(&valid_caa_mpic_request()))
        .await;

    assert_eq!(envelope.status_code, 200);
    let response = single_response(&envelope);
    assert!(response.is_valid);
    assert_eq!(response.actual_orchestration_parameters.attempt_count, 1);
    assert_eq!(response.actual_orchestration_parameters.perspective_count, 6);
    assert_eq!(response.actual_orchestration_parameters.quorum_count, 4);
    assert_eq!(response.perspectives.len(), 6);

    // Sorted for reproducibility.
    let codes: Vec<_> = response
        .perspectives
        .iter()
        .map(|p| p.perspective_code.clone())
        .collect();
    let mut sorted = codes.clone();
    sorted.sort();
    assert_eq!(codes, sorted);
}

#[tokio::test]
async fn defaults_apply_when_orchestration_parameters_are_absent() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let request = with_orchestration(valid_caa_mpic_request(), None);
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;

    assert_eq!(envelope.status_code, 200);
    let response = single_response(&envelope);
    assert!(response.is_valid);
    assert_eq!(response.actual_orchestration_parameters.perspective_count, 6);
    // Quorum falls back to the floor table.
    assert_eq!(response.actual_orchestration_parameters.quorum_count, 4);
}

#[tokio::test]
async fn empty_orchestration_parameters_behave_like_absent_ones() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let request = with_orchestration(
        valid_caa_mpic_request(),
        Some(MpicRequestOrchestrationParameters::default()),
    );
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
    assert_eq!(envelope.status_code, 200);
    assert!(single_response(&envelope).is_valid);
}

#[tokio::test]
async fn only_max_attempts_set_still_coordinates() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let request = with_orchestration(
        valid_caa_mpic_request(),
        Some(MpicRequestOrchestrationParameters {
            max_attempts: Some(2),
            ..Default::default()
        }),
    );
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
    assert_eq!(envelope.status_code, 200);
    let response = single_response(&envelope);
    assert!(response.is_valid);
    assert_eq!(response.actual_orchestration_parameters.attempt_count, 1);
}

#[tokio::test]
async fn exhausted_attempts_report_failure_with_final_attempt_number() {
    let coordinator = coordinator(ScriptedRemote::failing());
    let request = with_orchestration(valid_caa_mpic_request(), Some(orchestration(2, 1, 3)));
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;

    assert_eq!(envelope.status_code, 200);
    let response = single_response(&envelope);
    assert!(!response.is_valid);
    assert_eq!(response.actual_orchestration_parameters.attempt_count, 3);
    assert_eq!(response.perspectives.len(), 2);
}

#[tokio::test]
async fn corroboration_retries_until_a_cohort_succeeds() {
    // Three cohorts of two: fail the first, error the second, pass the third.
    let remote = ScriptedRemote::cycle(vec![
        RemoteOutcome::Fail,
        RemoteOutcome::Fail,
        RemoteOutcome::Error,
        RemoteOutcome::Error,
        RemoteOutcome::Pass,
        RemoteOutcome::Pass,
    ]);
    let coordinator = coordinator(remote);
    let request = with_orchestration(valid_caa_mpic_request(), Some(orchestration(2, 1, 3)));
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;

    assert_eq!(envelope.status_code, 200);
    let response = single_response(&envelope);
    assert!(response.is_valid);
    assert_eq!(response.actual_orchestration_parameters.attempt_count, 3);
}

#[tokio::test]
async fn global_max_attempts_caps_request_supplied_attempts() {
    let mut config = coordinator_config();
    config.global_max_attempts = Some(2);
    let coordinator =
        MpicCoordinator::new(Arc::new(ScriptedRemote::failing()), config).expect("valid config");

    let request = with_orchestration(valid_caa_mpic_request(), Some(orchestration(2, 1, 4)));
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;

    assert_eq!(envelope.status_code, 200);
    let response = single_response(&envelope);
    assert!(!response.is_valid);
    assert_eq!(response.actual_orchestration_parameters.attempt_count, 2);
}

#[tokio::test]
async fn attempts_cycle_back_through_the_cohort_sequence() {
    // Three cohorts of two. First run: fail cohort 1, succeed on cohort 2.
    let remote = ScriptedRemote::cycle(vec![
        RemoteOutcome::Fail,
        RemoteOutcome::Fail,
        RemoteOutcome::Pass,
        RemoteOutcome::Pass,
    ]);
    let first_coordinator = coordinator(remote);
    let request = with_orchestration(valid_caa_mpic_request(), Some(orchestration(2, 1, 2)));
    let first_envelope = first_coordinator.coordinate_mpic(&to_body(&request)).await;
    let mut first_cohort: Vec<_> = single_response(&first_envelope)
        .perspectives
        .iter()
        .map(|p| p.perspective_code.clone())
        .collect();
    first_cohort.sort();

    // Second run against a fresh coordinator with the same secret: fail
    // attempts 1-4 (cohorts 1, 2, 3, then 1 again) and succeed on attempt 5,
    // which must land on the same cohort as attempt 2.
    let remote = ScriptedRemote::cycle(vec![
        RemoteOutcome::Fail,
        RemoteOutcome::Fail,
        RemoteOutcome::Fail,
        RemoteOutcome::Fail,
        RemoteOutcome::Fail,
        RemoteOutcome::Fail,
        RemoteOutcome::Fail,
        RemoteOutcome::Fail,
        RemoteOutcome::Pass,
        RemoteOutcome::Pass,
    ]);
    let second_coordinator = coordinator(remote);
    let request = with_orchestration(valid_caa_mpic_request(), Some(orchestration(2, 1, 5)));
    let second_envelope = second_coordinator.coordinate_mpic(&to_body(&request)).await;
    let second_response = single_response(&second_envelope);
    assert_eq!(second_response.actual_orchestration_parameters.attempt_count, 5);
    let mut second_cohort: Vec<_> = second_response
        .perspectives
        .iter()
        .map(|p| p.perspective_code.clone())
        .collect();
    second_cohort.sort();

    assert_eq!(first_cohort, second_cohort);
}

#[tokio::test]
async fn combined_corroboration_requires_both_quorums() {
    let remote = ScriptedRemote::by_check_type(RemoteOutcome::Pass, RemoteOutcome::Fail);
    let coordinator = coordinator(remote);
    let envelope = coordinator
        .coordinate_mpic(&to_body(&valid_dcv_with_caa_mpic_request()))
        .await;

    assert_eq!(envelope.status_code, 200);
    let response = combined_response(&envelope);
    assert!(response.is_valid_caa);
    assert!(!response.is_valid_dcv);
    assert!(!response.is_valid);
    assert_eq!(response.perspectives_caa.len(), 6);
    assert_eq!(response.perspectives_dcv.len(), 6);
}

#[tokio::test]
async fn remote_failures_become_communication_error_responses() {
    for request in [
        valid_caa_mpic_request(),
        valid_dcv_mpic_request(),
        valid_dcv_with_caa_mpic_request(),
    ] {
        let coordinator = coordinator(ScriptedRemote::erroring());
        let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
        assert_eq!(envelope.status_code, 200);

        let perspectives = match serde_json::from_str::<MpicResponse>(&envelope.body).unwrap() {
            MpicResponse::Caa(r) | MpicResponse::Dcv(r) => {
                assert!(!r.is_valid);
                r.perspectives
            }
            MpicResponse::DcvWithCaa(r) => {
                assert!(!r.is_valid);
                r.perspectives_caa.into_iter().chain(r.perspectives_dcv).collect()
            }
        };
        assert!(!perspectives.is_empty());
        for perspective in perspectives {
            assert!(!perspective.check_passed);
            let errors = perspective.errors.expect("synthetic responses carry errors");
            assert_eq!(errors[0].error_type, "COORDINATOR_COMMUNICATION_ERROR");
        }
    }
}

#[tokio::test]
async fn remote_calls_receive_the_request_parameters() {
    let remote = Arc::new(ScriptedRemote::passing());
    let coordinator =
        MpicCoordinator::new(remote.clone(), coordinator_config()).expect("valid config");
    let request = with_orchestration(valid_caa_mpic_request(), Some(orchestration(2, 2, 2)));
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
    assert_eq!(envelope.status_code, 200);

    let calls = remote.recorded_calls();
    assert_eq!(calls.len(), 2);
    for call in calls {
        assert!(coordinator_config()
            .known_perspectives
            .contains(&call.perspective_code));
        assert_eq!(call.check_type, mpic_types::check::CheckType::Caa);
        assert_eq!(call.domain_or_ip_target, "test");
    }
}

#[tokio::test]
async fn diagnostic_perspective_override_forms_the_sole_cohort() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let request = with_orchestration(
        valid_caa_mpic_request(),
        Some(MpicRequestOrchestrationParameters {
            quorum_count: Some(2),
            perspectives: Some(vec![
                "arin.us-east-1".to_string(),
                "ripe.eu-west-2".to_string(),
            ]),
            ..Default::default()
        }),
    );
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
    assert_eq!(envelope.status_code, 200);
    let response = single_response(&envelope);
    assert!(response.is_valid);
    assert_eq!(response.actual_orchestration_parameters.perspective_count, 2);
    let codes: Vec<_> = response
        .perspectives
        .iter()
        .map(|p| p.perspective_code.as_str())
        .collect();
    assert_eq!(codes, vec!["arin.us-east-1", "ripe.eu-west-2"]);
}

#[tokio::test]
async fn unknown_override_perspective_fails_validation() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let request = with_orchestration(
        valid_caa_mpic_request(),
        Some(MpicRequestOrchestrationParameters {
            quorum_count: Some(1),
            perspectives: Some(vec!["lacnic.sa-east-1".to_string()]),
            ..Default::default()
        }),
    );
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
    assert_eq!(envelope.status_code, 400);
    assert!(validation_issues(&envelope).contains(&"invalid_perspectives".to_string()));
}

#[tokio::test]
async fn missing_target_is_a_validation_failure() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let body = r#"{"check_type": "caa"}"#;
    let envelope = coordinator.coordinate_mpic(body).await;
    assert_eq!(envelope.status_code, 400);
    assert!(validation_issues(&envelope).contains(&"missing_domain_or_ip_target".to_string()));
}

#[tokio::test]
async fn unknown_check_type_is_a_validation_failure() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let body = r#"{"check_type": "invalid_check_type", "domain_or_ip_target": "test"}"#;
    let envelope = coordinator.coordinate_mpic(body).await;
    assert_eq!(envelope.status_code, 400);
    assert!(validation_issues(&envelope).contains(&"invalid_check_type".to_string()));
}

#[tokio::test]
async fn unparseable_body_is_a_validation_failure() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let envelope = coordinator.coordinate_mpic("not json at all").await;
    assert_eq!(envelope.status_code, 400);
    assert!(validation_issues(&envelope).contains(&"malformed_request_body".to_string()));
}

#[tokio::test]
async fn perspective_count_beyond_registry_is_a_validation_failure() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let request = with_orchestration(valid_caa_mpic_request(), Some(orchestration(7, 4, 1)));
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
    assert_eq!(envelope.status_code, 400);
    assert!(validation_issues(&envelope).contains(&"invalid_perspective_count".to_string()));
}

#[tokio::test]
async fn quorum_beyond_perspective_count_is_a_validation_failure() {
    let coordinator = coordinator(ScriptedRemote::passing());
    let request = with_orchestration(valid_caa_mpic_request(), Some(orchestration(4, 5, 1)));
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
    assert_eq!(envelope.status_code, 400);
    assert!(validation_issues(&envelope).contains(&"invalid_quorum_count".to_string()));
}

#[tokio::test]
async fn quorum_floor_gap_requires_explicit_quorum() {
    let coordinator = coordinator(ScriptedRemote::passing());
    // Three perspectives is outside the floor table.
    let request = with_orchestration(
        valid_caa_mpic_request(),
        Some(MpicRequestOrchestrationParameters {
            perspective_count: Some(3),
            ..Default::default()
        }),
    );
    let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
    assert_eq!(envelope.status_code, 400);
    assert!(validation_issues(&envelope).contains(&"quorum_count_required".to_string()));
}

#[tokio::test]
async fn quorum_floor_applies_per_perspective_count() {
    for (perspective_count, expected_quorum) in [(4u32, 3u32), (5, 4), (6, 4)] {
        let coordinator = coordinator(ScriptedRemote::passing());
        let request = with_orchestration(
            valid_caa_mpic_request(),
            Some(MpicRequestOrchestrationParameters {
                perspective_count: Some(perspective_count),
                ..Default::default()
            }),
        );
        let envelope = coordinator.coordinate_mpic(&to_body(&request)).await;
        assert_eq!(envelope.status_code, 200);
        let response = single_response(&envelope);
        assert_eq!(
            response.actual_orchestration_parameters.quorum_count,
            expected_quorum
        );
    }
}
