// Path: crates/caa-checker/src/resolver.rs
//! The DNS seam for the CAA checker.
//!
//! The checker only ever needs one operation: "give me the CAA RRset at this
//! name, or tell me there is none". Keeping that behind a trait lets tests
//! drive the tree climb with an in-memory zone map while production wraps a
//! real recursive resolver.

use async_trait::async_trait;
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::rdata::caa::{KeyValue, Property, Value};
use hickory_resolver::proto::rr::{Name, RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use thiserror::Error;

/// A single CAA resource record, reduced to what the issuance decision needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaaRecord {
    /// Whether the record's critical flag (high bit of the flags byte) is set.
    pub critical: bool,
    /// The record's property tag.
    pub tag: CaaTag,
    /// The property value, in presentation form.
    pub value: String,
}

/// The CAA property tags the checker distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaaTag {
    /// `issue`: names an issuer permitted for ordinary certificates.
    Issue,
    /// `issuewild`: names an issuer permitted for wildcard certificates.
    IssueWild,
    /// Any other tag, carried verbatim for critical-flag handling.
    Other(String),
}

impl CaaTag {
    /// The presentation form of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            CaaTag::Issue => "issue",
            CaaTag::IssueWild => "issuewild",
            CaaTag::Other(tag) => tag,
        }
    }
}

/// The two lookup outcomes the tree climb distinguishes.
#[derive(Debug, Error)]
pub enum CaaLookupError {
    /// The name has no CAA RRset; the climb continues at the parent.
    #[error("no CAA records at {0}")]
    NoRecords(String),
    /// The lookup itself failed (timeout, SERVFAIL, transport); the check
    /// fails rather than climbing past a name whose answer is unknown.
    #[error("lookup failed for {domain}: {reason}")]
    Failed {
        /// The name whose lookup failed.
        domain: String,
        /// The resolver's description of the failure.
        reason: String,
    },
}

/// Resolves the CAA RRset for a single DNS name.
#[async_trait]
pub trait CaaResolver: Send + Sync {
    /// Returns the CAA records at `domain`, or `CaaLookupError::NoRecords`
    /// when the name carries none.
    async fn lookup_caa(&self, domain: &str) -> Result<Vec<CaaRecord>, CaaLookupError>;
}

/// The production resolver, backed by `hickory_resolver`.
pub struct HickoryCaaResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryCaaResolver {
    /// Wraps an already-configured resolver.
    pub fn new(resolver: TokioAsyncResolver) -> Self {
        Self { resolver }
    }

    /// Builds a resolver from the host's `/etc/resolv.conf`.
    pub fn from_system_conf() -> Result<Self, ResolveError> {
        Ok(Self {
            resolver: TokioAsyncResolver::tokio_from_system_conf()?,
        })
    }
}

#[async_trait]
impl CaaResolver for HickoryCaaResolver {
    async fn lookup_caa(&self, domain: &str) -> Result<Vec<CaaRecord>, CaaLookupError> {
        match self.resolver.lookup(domain, RecordType::CAA).await {
            Ok(lookup) => {
                let records: Vec<CaaRecord> = lookup
                    .iter()
                    .filter_map(|rdata| match rdata {
                        RData::CAA(caa) => Some(caa_record_from_rdata(caa)),
                        _ => None,
                    })
                    .collect();
                if records.is_empty() {
                    Err(CaaLookupError::NoRecords(domain.to_string()))
                } else {
                    Ok(records)
                }
            }
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => {
                    Err(CaaLookupError::NoRecords(domain.to_string()))
                }
                _ => Err(CaaLookupError::Failed {
                    domain: domain.to_string(),
                    reason: e.to_string(),
                }),
            },
        }
    }
}

fn caa_record_from_rdata(caa: &hickory_resolver::proto::rr::rdata::CAA) -> CaaRecord {
    let tag = match caa.tag() {
        Property::Issue => CaaTag::Issue,
        Property::IssueWild => CaaTag::IssueWild,
        other => CaaTag::Other(other.as_str().to_string()),
    };
    let value = match caa.value() {
        Value::Issuer(name, params) => render_issuer_value(name.as_ref(), params),
        Value::Url(url) => url.to_string(),
        Value::Unknown(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    };
    CaaRecord {
        critical: caa.issuer_critical(),
        tag,
        value,
    }
}

/// Rebuilds the presentation form of an issuer value. A bare semicolon is the
/// canonical "no issuer authorized" form; appended key-value parameters keep
/// the `;` separator so the conservative no-extension-parsing policy applies.
fn render_issuer_value(name: Option<&Name>, params: &[KeyValue]) -> String {
    let mut out = name
        .map(|n| n.to_utf8().trim_end_matches('.').to_string())
        .unwrap_or_default();
    if out.is_empty() && params.is_empty() {
        return ";".to_string();
    }
    for kv in params {
        out.push_str("; ");
        out.push_str(kv.key());
        out.push('=');
        out.push_str(kv.value());
    }
    out
}
