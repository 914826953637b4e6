// Path: crates/test_utils/src/requests.rs
//! Builders for well-formed MPIC requests, one per check type.

use mpic_types::check::{
    CaaCheckParameters, CertificateType, DcvCheckParameters, DcvValidationDetails, DnsRecordType,
};
use mpic_types::mpic::{
    MpicCaaRequest, MpicDcvRequest, MpicDcvWithCaaRequest, MpicRequest,
    MpicRequestOrchestrationParameters,
};

/// The target every canned request points at.
pub const TEST_TARGET: &str = "test";

fn default_orchestration() -> MpicRequestOrchestrationParameters {
    MpicRequestOrchestrationParameters {
        perspective_count: Some(6),
        quorum_count: Some(4),
        max_attempts: None,
        perspectives: None,
    }
}

/// A valid CAA corroboration request for six perspectives with quorum four.
pub fn valid_caa_mpic_request() -> MpicRequest {
    MpicRequest::Caa(MpicCaaRequest {
        domain_or_ip_target: TEST_TARGET.to_string(),
        orchestration_parameters: Some(default_orchestration()),
        caa_check_parameters: Some(CaaCheckParameters {
            certificate_type: CertificateType::TlsServer,
            caa_domains: None,
        }),
    })
}

/// The DNS-change validation details shared by the DCV request builders.
pub fn dns_change_validation_details() -> DcvValidationDetails {
    DcvValidationDetails::DnsChange {
        dns_name_prefix: "test".to_string(),
        dns_record_type: DnsRecordType::A,
        challenge_value: "test".to_string(),
    }
}

/// A valid DCV corroboration request for six perspectives with quorum four.
pub fn valid_dcv_mpic_request() -> MpicRequest {
    MpicRequest::Dcv(MpicDcvRequest {
        domain_or_ip_target: TEST_TARGET.to_string(),
        orchestration_parameters: Some(default_orchestration()),
        dcv_check_parameters: DcvCheckParameters {
            validation_details: dns_change_validation_details(),
        },
    })
}

/// A valid combined CAA + DCV corroboration request.
pub fn valid_dcv_with_caa_mpic_request() -> MpicRequest {
    MpicRequest::DcvWithCaa(MpicDcvWithCaaRequest {
        domain_or_ip_target: TEST_TARGET.to_string(),
        orchestration_parameters: Some(default_orchestration()),
        caa_check_parameters: Some(CaaCheckParameters {
            certificate_type: CertificateType::TlsServer,
            caa_domains: None,
        }),
        dcv_check_parameters: DcvCheckParameters {
            validation_details: dns_change_validation_details(),
        },
    })
}

/// Returns the request with its orchestration parameters replaced.
pub fn with_orchestration(
    request: MpicRequest,
    params: Option<MpicRequestOrchestrationParameters>,
) -> MpicRequest {
    match request {
        MpicRequest::Caa(mut r) => {
            r.orchestration_parameters = params;
            MpicRequest::Caa(r)
        }
        MpicRequest::Dcv(mut r) => {
            r.orchestration_parameters = params;
            MpicRequest::Dcv(r)
        }
        MpicRequest::DcvWithCaa(mut r) => {
            r.orchestration_parameters = params;
            MpicRequest::DcvWithCaa(r)
        }
    }
}

/// Serializes any request to the JSON body `coordinate_mpic` accepts.
pub fn to_body(request: &MpicRequest) -> String {
    serde_json::to_string(request).expect("test request serializes")
}
