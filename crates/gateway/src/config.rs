// Path: crates/gateway/src/config.rs
//! Configuration for the `mpicd` gateway (`mpicd.toml`).
//!
//! One binary serves either role, or both: a `[coordinator]` section enables
//! `POST /mpic`, a `[perspective]` section enables `POST /caa-check`.

use anyhow::Context;
use mpic_types::config::{CaaCheckerConfig, CoordinatorConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

fn default_remote_call_timeout_secs() -> u64 {
    30
}

/// Top-level gateway configuration.
#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    /// The network address and port for the public gateway to listen on.
    pub listen_address: String,
    /// Where to serve `/metrics`, `/healthz`, and `/readyz`; disabled if unset.
    #[serde(default)]
    pub telemetry_listen_address: Option<String>,
    /// Coordinator-role configuration.
    #[serde(default)]
    pub coordinator: Option<CoordinatorRoleConfig>,
    /// Perspective-role configuration.
    #[serde(default)]
    pub perspective: Option<PerspectiveRoleConfig>,
}

/// Configuration for the coordinator role (`[coordinator]`).
#[derive(Debug, Deserialize)]
pub struct CoordinatorRoleConfig {
    /// The orchestration configuration handed to `MpicCoordinator::new`.
    #[serde(flatten)]
    pub coordinator: CoordinatorConfig,
    /// Base URL per perspective wire code, e.g.
    /// `"arin.us-east-1" = "https://use1.mpic.example"`.
    pub perspective_endpoints: BTreeMap<String, String>,
    /// Per-call timeout for remote perspective calls.
    #[serde(default = "default_remote_call_timeout_secs")]
    pub remote_call_timeout_secs: u64,
}

/// Configuration for the perspective role (`[perspective]`).
#[derive(Debug, Deserialize)]
pub struct PerspectiveRoleConfig {
    /// The local CAA checker's identity and default issuer domains.
    #[serde(flatten)]
    pub checker: CaaCheckerConfig,
}

impl GatewayConfig {
    /// Loads and parses an `mpicd.toml`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("parsing configuration file {}", path.display()))
    }
}
