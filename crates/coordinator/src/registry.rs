// Path: crates/coordinator/src/registry.rs
//! The immutable set of known perspectives, fixed at coordinator construction.

use mpic_types::error::ConfigError;
use mpic_types::perspective::{RemotePerspective, Rir};
use std::collections::HashSet;

/// Holds every perspective the coordinator may select into a cohort.
///
/// Built once from the configured `<rir>.<code>` wire codes and never
/// mutated, so it is safe to share across concurrent coordinations.
#[derive(Debug, Clone)]
pub struct PerspectiveRegistry {
    perspectives: Vec<RemotePerspective>,
}

impl PerspectiveRegistry {
    /// Parses and validates the configured wire codes.
    pub fn from_wire_codes(codes: &[String]) -> Result<Self, ConfigError> {
        if codes.is_empty() {
            return Err(ConfigError::EmptyPerspectiveSet);
        }
        let mut seen = HashSet::new();
        let mut perspectives = Vec::with_capacity(codes.len());
        for code in codes {
            let perspective = RemotePerspective::from_rir_code(code)?;
            if !seen.insert(perspective.to_rir_code()) {
                return Err(ConfigError::DuplicatePerspective(code.clone()));
            }
            perspectives.push(perspective);
        }
        Ok(Self { perspectives })
    }

    /// Every known perspective, in configuration order.
    pub fn all(&self) -> &[RemotePerspective] {
        &self.perspectives
    }

    /// The number of known perspectives.
    pub fn len(&self) -> usize {
        self.perspectives.len()
    }

    /// Whether the registry is empty. Construction forbids this, so it only
    /// exists to satisfy the usual `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.perspectives.is_empty()
    }

    /// Looks a perspective up by its `<rir>.<code>` wire code.
    pub fn get(&self, wire_code: &str) -> Option<&RemotePerspective> {
        self.perspectives
            .iter()
            .find(|p| p.to_rir_code() == wire_code)
    }

    /// The perspectives tagged with `rir`, in configuration order.
    pub fn by_rir(&self, rir: Rir) -> Vec<&RemotePerspective> {
        self.perspectives.iter().filter(|p| p.rir == rir).collect()
    }

    /// How many distinct RIRs the registry spans.
    pub fn distinct_rir_count(&self) -> usize {
        self.perspectives
            .iter()
            .map(|p| p.rir)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_from_valid_wire_codes() {
        let registry = PerspectiveRegistry::from_wire_codes(&codes(&[
            "arin.us-east-1",
            "ripe.eu-west-2",
            "apnic.ap-south-2",
        ]))
        .unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.distinct_rir_count(), 3);
        assert!(registry.get("ripe.eu-west-2").is_some());
        assert!(registry.get("ripe.eu-west-9").is_none());
    }

    #[test]
    fn rejects_unknown_rir_prefix() {
        let err = PerspectiveRegistry::from_wire_codes(&codes(&["iana.us-east-1"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRir(_)));
    }

    #[test]
    fn rejects_duplicates_and_empty_sets() {
        let err = PerspectiveRegistry::from_wire_codes(&codes(&["arin.us-east-1", "arin.us-east-1"]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePerspective(_)));

        let err = PerspectiveRegistry::from_wire_codes(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPerspectiveSet));
    }

    #[test]
    fn groups_by_rir() {
        let registry = PerspectiveRegistry::from_wire_codes(&codes(&[
            "arin.us-east-1",
            "arin.us-west-1",
            "ripe.eu-west-2",
        ]))
        .unwrap();
        assert_eq!(registry.by_rir(Rir::Arin).len(), 2);
        assert_eq!(registry.by_rir(Rir::Ripe).len(), 1);
        assert!(registry.by_rir(Rir::Lacnic).is_empty());
    }
}
