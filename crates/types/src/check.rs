// Path: crates/types/src/check.rs
//! Check-level request types: what the coordinator sends to a single
//! perspective for one CAA or DCV check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of corroboration a client asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    /// Certification Authority Authorization lookup (RFC 8659).
    Caa,
    /// Domain Control Validation.
    Dcv,
    /// Combined request; CAA and DCV quorums must both be satisfied.
    DcvWithCaa,
}

impl CheckType {
    /// The snake_case wire form used as the request/response discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Caa => "caa",
            CheckType::Dcv => "dcv",
            CheckType::DcvWithCaa => "dcv_with_caa",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The certificate type issuance is being corroborated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateType {
    /// An ordinary TLS server certificate.
    #[serde(rename = "tls-server")]
    TlsServer,
    /// A wildcard TLS server certificate; CAA `issuewild` tags take precedence.
    #[serde(rename = "tls-server-wildcard")]
    TlsServerWildcard,
}

/// Parameters for a CAA check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaaCheckParameters {
    /// The certificate type the CA intends to issue.
    pub certificate_type: CertificateType,
    /// Issuer domains to accept in place of the configured default list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caa_domains: Option<Vec<String>>,
}

/// DNS record types a DCV challenge may be published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    #[serde(rename = "AAAA")]
    Aaaa,
    /// Canonical name record.
    #[serde(rename = "CNAME")]
    Cname,
    /// Text record.
    #[serde(rename = "TXT")]
    Txt,
}

/// Method-specific validation details, tagged by `validation_method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "validation_method")]
pub enum DcvValidationDetails {
    /// Challenge published in a DNS record under a well-known prefix.
    #[serde(rename = "dns-change")]
    DnsChange {
        /// Label prepended to the target domain, e.g. `_acme-challenge`.
        dns_name_prefix: String,
        /// Record type the challenge is published under.
        dns_record_type: DnsRecordType,
        /// The expected challenge value.
        challenge_value: String,
    },
    /// Generic DNS challenge without a mandated prefix semantic.
    #[serde(rename = "dns-generic")]
    DnsGeneric {
        /// Label prepended to the target domain.
        dns_name_prefix: String,
        /// Record type the challenge is published under.
        dns_record_type: DnsRecordType,
        /// The expected challenge value.
        challenge_value: String,
    },
    /// Challenge published at a well-known HTTP path.
    #[serde(rename = "website-change-v2")]
    WebsiteChangeV2 {
        /// Full token path the perspective fetches.
        http_token_path: String,
        /// The expected challenge value.
        challenge_value: String,
    },
}

/// Parameters for a DCV check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcvCheckParameters {
    /// The tagged validation details for the requested method.
    pub validation_details: DcvValidationDetails,
}

/// A CAA check request as sent to a single perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaaCheckRequest {
    /// The domain or IP the check targets.
    pub domain_or_ip_target: String,
    /// Optional CAA parameters; absent means coordinator defaults apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caa_check_parameters: Option<CaaCheckParameters>,
}

/// A DCV check request as sent to a single perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcvCheckRequest {
    /// The domain or IP the check targets.
    pub domain_or_ip_target: String,
    /// The validation method and its details.
    pub dcv_check_parameters: DcvCheckParameters,
}

/// The per-perspective check request union, tagged by `check_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check_type")]
pub enum CheckRequest {
    /// A CAA check.
    #[serde(rename = "caa")]
    Caa(CaaCheckRequest),
    /// A DCV check.
    #[serde(rename = "dcv")]
    Dcv(DcvCheckRequest),
}

impl CheckRequest {
    /// The domain or IP the check targets, independent of check type.
    pub fn domain_or_ip_target(&self) -> &str {
        match self {
            CheckRequest::Caa(r) => &r.domain_or_ip_target,
            CheckRequest::Dcv(r) => &r.domain_or_ip_target,
        }
    }
}
