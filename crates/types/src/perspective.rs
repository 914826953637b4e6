// Path: crates/types/src/perspective.rs
//! The perspective model: Regional Internet Registry tags and region codes.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Regional Internet Registry. Every perspective is tagged with exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rir {
    /// American Registry for Internet Numbers.
    Arin,
    /// Réseaux IP Européens Network Coordination Centre.
    Ripe,
    /// Asia-Pacific Network Information Centre.
    Apnic,
    /// Latin America and Caribbean Network Information Centre.
    Lacnic,
    /// African Network Information Centre.
    Afrinic,
}

impl Rir {
    /// All registries, in canonical order.
    pub const ALL: [Rir; 5] = [Rir::Arin, Rir::Ripe, Rir::Apnic, Rir::Lacnic, Rir::Afrinic];

    /// The lowercase wire form of the registry tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rir::Arin => "arin",
            Rir::Ripe => "ripe",
            Rir::Apnic => "apnic",
            Rir::Lacnic => "lacnic",
            Rir::Afrinic => "afrinic",
        }
    }
}

impl fmt::Display for Rir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rir {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arin" => Ok(Rir::Arin),
            "ripe" => Ok(Rir::Ripe),
            "apnic" => Ok(Rir::Apnic),
            "lacnic" => Ok(Rir::Lacnic),
            "afrinic" => Ok(Rir::Afrinic),
            other => Err(ConfigError::UnknownRir(other.to_string())),
        }
    }
}

/// A network vantage point from which checks are corroborated, identified by
/// its RIR tag and a region code (e.g. `us-east-1`).
///
/// The wire form is `<rir>.<code>`, e.g. `arin.us-east-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemotePerspective {
    /// The Regional Internet Registry this perspective observes from.
    pub rir: Rir,
    /// The region code within the RIR, e.g. `us-east-1`.
    pub code: String,
}

impl RemotePerspective {
    /// Builds the `<rir>.<code>` wire form.
    pub fn to_rir_code(&self) -> String {
        format!("{}.{}", self.rir, self.code)
    }

    /// Parses a `<rir>.<code>` wire form.
    pub fn from_rir_code(s: &str) -> Result<Self, ConfigError> {
        let (rir, code) = s
            .split_once('.')
            .ok_or_else(|| ConfigError::MalformedPerspective(s.to_string()))?;
        if code.is_empty() {
            return Err(ConfigError::MalformedPerspective(s.to_string()));
        }
        Ok(RemotePerspective {
            rir: rir.parse()?,
            code: code.to_string(),
        })
    }

    /// Two perspectives are RIR-distinct iff their RIR tags differ.
    pub fn is_rir_distinct_from(&self, other: &RemotePerspective) -> bool {
        self.rir != other.rir
    }
}

impl fmt::Display for RemotePerspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.rir, self.code)
    }
}
