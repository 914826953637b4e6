// Path: crates/caa-checker/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]

//! # MPIC CAA Checker
//!
//! Decides, for a single perspective, whether CAA policy permits issuance for
//! a target (RFC 8659): climb the DNS tree from the target to the root, take
//! the first CAA RRset found, and evaluate its `issue`/`issuewild` tags
//! against the effective issuer domain list.

pub mod resolver;

use mpic_types::check::{CaaCheckRequest, CertificateType};
use mpic_types::config::CaaCheckerConfig;
use mpic_types::error::{CaaCheckError, ConfigError, ErrorCode};
use mpic_types::perspective::RemotePerspective;
use mpic_types::response::{
    now_timestamp_ns, CaaCheckResponseDetails, CheckError, CheckResponse, CheckResponseDetails,
};
use resolver::{CaaRecord, CaaResolver, CaaTag};
use std::sync::Arc;
use tracing::debug;


/// The per-perspective CAA checker.
pub struct MpicCaaChecker {
    perspective_code: String,
    default_caa_domains: Vec<String>,
    resolver: Arc<dyn CaaResolver>,
}

impl MpicCaaChecker {
    /// Builds a checker for the configured perspective identity.
    pub fn new(config: &CaaCheckerConfig, resolver: Arc<dyn CaaResolver>) -> Result<Self, ConfigError> {
        let perspective = RemotePerspective::from_rir_code(&config.perspective)?;
        Ok(Self {
            perspective_code: perspective.to_rir_code(),
            default_caa_domains: config.default_caa_domains.clone(),
            resolver,
        })
    }

    /// Runs one CAA check and reports this perspective's verdict.
    ///
    /// Lookup failures are part of the verdict, not an error path: the caller
    /// always gets a `CheckResponse`.
    pub async fn check_caa(&self, request: &CaaCheckRequest) -> CheckResponse {
        let caa_domains: &[String] = request
            .caa_check_parameters
            .as_ref()
            .and_then(|p| p.caa_domains.as_deref())
            .unwrap_or(&self.default_caa_domains);
        let is_wildcard = request
            .caa_check_parameters
            .as_ref()
            .map(|p| p.certificate_type == CertificateType::TlsServerWildcard)
            .unwrap_or(false);

        match self.find_caa_records(&request.domain_or_ip_target).await {
            Err(error) => CheckResponse {
                perspective_code: self.perspective_code.clone(),
                check_passed: false,
                details: CheckResponseDetails::Caa(CaaCheckResponseDetails::default()),
                errors: Some(vec![CheckError {
                    error_type: error.code().to_string(),
                    error_message: error.to_string(),
                }]),
                timestamp_ns: now_timestamp_ns(),
            },
            // No CAA RRset at the target or any ancestor: issuance proceeds.
            Ok(None) => CheckResponse {
                perspective_code: self.perspective_code.clone(),
                check_passed: true,
                details: CheckResponseDetails::Caa(CaaCheckResponseDetails {
                    caa_record_present: false,
                    found_at: None,
                    response_text: None,
                }),
                errors: None,
                timestamp_ns: now_timestamp_ns(),
            },
            Ok(Some((found_at, records))) => {
                let check_passed = Self::is_valid_for_issuance(caa_domains, is_wildcard, &records);
                CheckResponse {
                    perspective_code: self.perspective_code.clone(),
                    check_passed,
                    details: CheckResponseDetails::Caa(CaaCheckResponseDetails {
                        caa_record_present: true,
                        found_at: Some(found_at),
                        response_text: Some(render_rrset_text(&records)),
                    }),
                    errors: None,
                    timestamp_ns: now_timestamp_ns(),
                }
            }
        }
    }

    /// Climbs from the target toward the root, returning the first CAA RRset
    /// found together with the name it was found at.
    async fn find_caa_records(
        &self,
        target: &str,
    ) -> Result<Option<(String, Vec<CaaRecord>)>, CaaCheckError> {
        let mut labels: Vec<&str> = target
            .trim_end_matches('.')
            .split('.')
            .filter(|label| !label.is_empty())
            .collect();

        while !labels.is_empty() {
            let name = labels.join(".");
            match self.resolver.lookup_caa(&name).await {
                Ok(records) if !records.is_empty() => {
                    debug!(target: "caa-checker", domain = %name, records = records.len(), "found CAA RRset");
                    return Ok(Some((name, records)));
                }
                Ok(_) | Err(resolver::CaaLookupError::NoRecords(_)) => {
                    debug!(target: "caa-checker", domain = %name, "no CAA records, climbing to parent");
                    labels.remove(0);
                }
                Err(resolver::CaaLookupError::Failed { domain, reason }) => {
                    return Err(CaaCheckError::Lookup { domain, reason });
                }
            }
        }
        Ok(None)
    }

    /// The RFC 8659 issuance decision over one RRset.
    fn is_valid_for_issuance(caa_domains: &[String], is_wildcard: bool, records: &[CaaRecord]) -> bool {
        let mut issue_values = Vec::new();
        let mut issuewild_values = Vec::new();
        let mut has_unknown_critical = false;

        for record in records {
            match &record.tag {
                CaaTag::Issue => issue_values.push(record.value.as_str()),
                CaaTag::IssueWild => issuewild_values.push(record.value.as_str()),
                CaaTag::Other(_) if record.critical => has_unknown_critical = true,
                CaaTag::Other(_) => {}
            }
        }

        if has_unknown_critical {
            // An unrecognized tag with the critical flag forbids issuance
            // regardless of any issue/issuewild tags present.
            return false;
        }
        if is_wildcard && !issuewild_values.is_empty() {
            Self::value_list_permits_issuance(&issuewild_values, caa_domains)
        } else if !issue_values.is_empty() {
            Self::value_list_permits_issuance(&issue_values, caa_domains)
        } else {
            // Records exist but none restrict the requested issuance.
            true
        }
    }

    fn value_list_permits_issuance(values: &[&str], caa_domains: &[String]) -> bool {
        values.iter().any(|value| {
            // No parsing for CAA extensions; a value carrying parameters
            // never matches.
            if value.contains(';') {
                return false;
            }
            let trimmed = value.trim();
            caa_domains.iter().any(|domain| domain == trimmed)
        })
    }
}

fn render_rrset_text(records: &[CaaRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let flags: u8 = if r.critical { 0x80 } else { 0 };
            format!("{} {} \"{}\"", flags, r.tag.as_str(), r.value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
