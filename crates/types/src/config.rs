// Path: crates/types/src/config.rs
//! Shared configuration structures for the coordinator and checker roles.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_perspective_count() -> u32 {
    6
}

/// Configuration for an `MpicCoordinator`, fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// The known perspectives, as `<rir>.<code>` wire codes.
    pub known_perspectives: Vec<String>,
    /// Perspective count applied when a request does not specify one.
    #[serde(default = "default_perspective_count")]
    pub default_perspective_count: u32,
    /// Whether cohorts must be built from pairwise-distinct RIRs when the
    /// cohort size allows it.
    #[serde(default = "default_true")]
    pub enforce_distinct_rir_regions: bool,
    /// Hard cap applied over any request-supplied `max_attempts`.
    #[serde(default)]
    pub global_max_attempts: Option<u32>,
    /// Opaque secret seeding the per-target cohort shuffle. Replicas sharing
    /// this secret produce identical cohort sequences.
    pub hash_secret: String,
}

/// Configuration for the CAA checker running at a single perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaaCheckerConfig {
    /// This perspective's `<rir>.<code>` identity, reported in responses.
    pub perspective: String,
    /// Issuer domains permitted when a request does not supply its own list.
    pub default_caa_domains: Vec<String>,
}
