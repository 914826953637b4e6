// Path: crates/coordinator/src/cohorts.rs
//! Deterministic cohort construction.
//!
//! Cohorts are disjoint subsets of the registry, one per attempt, built so
//! that repeated attempts exercise different vantage points while replicas
//! sharing the same hash secret agree on the full cohort sequence for a
//! target without coordinating.

use crate::registry::PerspectiveRegistry;
use hmac::{Hmac, Mac};
use mpic_types::error::CohortError;
use mpic_types::perspective::{RemotePerspective, Rir};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::collections::VecDeque;

type HmacSha256 = Hmac<Sha256>;

/// Derives the per-target shuffle seed as `HMAC-SHA256(hash_secret, target)`.
///
/// A keyed PRF rather than a bare hash: without the secret, an applicant who
/// controls the target name cannot predict or steer which perspectives will
/// observe it.
pub(crate) fn derive_shuffle_seed(hash_secret: &[u8], target: &str) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(hash_secret).expect("HMAC accepts keys of any length");
    mac.update(target.as_bytes());
    let digest = mac.finalize().into_bytes();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    seed
}

/// Partitions the registry into disjoint cohorts of `cohort_size`.
///
/// Perspectives left over after the last full cohort are discarded for this
/// target. When `enforce_distinct_rir_regions` holds and the cohort size does
/// not exceed the number of RIRs present, every cohort draws each member from
/// a different RIR; otherwise cohorts are packed round-robin across RIR
/// groups, which maximizes per-cohort RIR coverage.
pub fn build_cohorts(
    registry: &PerspectiveRegistry,
    hash_secret: &[u8],
    target: &str,
    cohort_size: usize,
    enforce_distinct_rir_regions: bool,
) -> Result<Vec<Vec<RemotePerspective>>, CohortError> {
    if cohort_size == 0 {
        return Err(CohortError::EmptyCohort);
    }
    if cohort_size > registry.len() {
        return Err(CohortError::SizeExceedsPerspectives {
            requested: cohort_size,
            available: registry.len(),
        });
    }

    let mut rng = ChaCha20Rng::from_seed(derive_shuffle_seed(hash_secret, target));

    let mut groups: Vec<Vec<RemotePerspective>> = Rir::ALL
        .iter()
        .map(|rir| {
            registry
                .by_rir(*rir)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect();
    groups.shuffle(&mut rng);
    for group in &mut groups {
        group.shuffle(&mut rng);
    }

    let cohorts = if enforce_distinct_rir_regions && cohort_size <= groups.len() {
        rir_distinct_cohorts(groups, cohort_size)
    } else {
        packed_cohorts(groups, cohort_size)
    };
    Ok(cohorts)
}

/// Builds cohorts by taking one member from each of `cohort_size` distinct
/// RIR groups, rotating the starting group between cohorts so successive
/// attempts favor different registries.
fn rir_distinct_cohorts(
    groups: Vec<Vec<RemotePerspective>>,
    cohort_size: usize,
) -> Vec<Vec<RemotePerspective>> {
    let mut queues: Vec<VecDeque<RemotePerspective>> =
        groups.into_iter().map(VecDeque::from).collect();
    let group_count = queues.len();
    let mut cohorts = Vec::new();
    let mut offset = 0usize;

    loop {
        let mut cohort = Vec::with_capacity(cohort_size);
        let mut visited = 0usize;
        let mut index = offset;
        // Each group is visited at most once per cohort, so members of one
        // cohort are pairwise RIR-distinct.
        while cohort.len() < cohort_size && visited < group_count {
            if let Some(perspective) = queues[index].pop_front() {
                cohort.push(perspective);
            }
            index = (index + 1) % group_count;
            visited += 1;
        }
        if cohort.len() < cohort_size {
            // Not enough distinct RIRs left for another full cohort.
            break;
        }
        offset = index;
        cohorts.push(cohort);
    }
    cohorts
}

/// Flattens the groups round-robin and chunks the sequence, discarding the
/// partial tail. Adjacent positions come from different groups whenever more
/// than one group still has members, so each chunk spreads across RIRs.
fn packed_cohorts(
    groups: Vec<Vec<RemotePerspective>>,
    cohort_size: usize,
) -> Vec<Vec<RemotePerspective>> {
    let total: usize = groups.iter().map(Vec::len).sum();
    let mut queues: Vec<VecDeque<RemotePerspective>> =
        groups.into_iter().map(VecDeque::from).collect();
    let mut sequence = Vec::with_capacity(total);
    while sequence.len() < total {
        for queue in &mut queues {
            if let Some(perspective) = queue.pop_front() {
                sequence.push(perspective);
            }
        }
    }
    sequence
        .chunks_exact(cohort_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn registry(codes: &[&str]) -> PerspectiveRegistry {
        let codes: Vec<String> = codes.iter().map(|s| s.to_string()).collect();
        PerspectiveRegistry::from_wire_codes(&codes).unwrap()
    }

    fn six_perspectives() -> PerspectiveRegistry {
        registry(&[
            "arin.us-east-1",
            "arin.us-west-1",
            "ripe.eu-west-2",
            "ripe.eu-central-2",
            "apnic.ap-northeast-1",
            "apnic.ap-south-2",
        ])
    }

    #[test]
    fn seed_is_deterministic_per_secret_and_target() {
        let a = derive_shuffle_seed(b"secret", "example.com");
        let b = derive_shuffle_seed(b"secret", "example.com");
        assert_eq!(a, b);
        assert_ne!(a, derive_shuffle_seed(b"secret", "example.org"));
        assert_ne!(a, derive_shuffle_seed(b"other", "example.com"));
    }

    #[test]
    fn cohort_sequence_is_deterministic() {
        let registry = six_perspectives();
        let first = build_cohorts(&registry, b"secret", "example.com", 2, true).unwrap();
        let second = build_cohorts(&registry, b"secret", "example.com", 2, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn disjoint_cohorts_cover_the_registry() {
        let registry = six_perspectives();
        let cohorts = build_cohorts(&registry, b"secret", "example.com", 2, true).unwrap();
        assert_eq!(cohorts.len(), 3);

        let mut seen = HashSet::new();
        for cohort in &cohorts {
            assert_eq!(cohort.len(), 2);
            for perspective in cohort {
                assert!(seen.insert(perspective.to_rir_code()), "perspective reused");
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn enforced_cohorts_are_rir_distinct() {
        let registry = six_perspectives();
        for size in [2usize, 3] {
            let cohorts = build_cohorts(&registry, b"secret", "example.com", size, true).unwrap();
            for cohort in &cohorts {
                let rirs: HashSet<_> = cohort.iter().map(|p| p.rir).collect();
                assert_eq!(rirs.len(), cohort.len(), "duplicate RIR within a cohort");
            }
        }
    }

    #[test]
    fn oversize_cohorts_fall_back_to_packing() {
        // Four perspectives per cohort across three RIRs cannot be pairwise
        // distinct; the packed layout still yields one full cohort.
        let registry = six_perspectives();
        let cohorts = build_cohorts(&registry, b"secret", "example.com", 4, true).unwrap();
        assert_eq!(cohorts.len(), 1);
        assert_eq!(cohorts[0].len(), 4);
        let rirs: HashSet<_> = cohorts[0].iter().map(|p| p.rir).collect();
        assert_eq!(rirs.len(), 3, "packed cohort should still span all RIRs");
    }

    #[test]
    fn single_cohort_of_full_registry() {
        let registry = six_perspectives();
        let cohorts = build_cohorts(&registry, b"secret", "example.com", 6, true).unwrap();
        assert_eq!(cohorts.len(), 1);
        assert_eq!(cohorts[0].len(), 6);
    }

    #[test]
    fn cohort_size_exceeding_registry_is_an_error() {
        let registry = six_perspectives();
        let err = build_cohorts(&registry, b"secret", "example.com", 7, true).unwrap_err();
        assert!(matches!(err, CohortError::SizeExceedsPerspectives { requested: 7, available: 6 }));
    }

    #[test]
    fn zero_cohort_size_is_an_error() {
        let registry = six_perspectives();
        let err = build_cohorts(&registry, b"secret", "example.com", 0, true).unwrap_err();
        assert!(matches!(err, CohortError::EmptyCohort));
    }

    #[test]
    fn unenforced_cohorts_still_partition() {
        let registry = six_perspectives();
        let cohorts = build_cohorts(&registry, b"secret", "example.com", 3, false).unwrap();
        assert_eq!(cohorts.len(), 2);
        let mut seen = HashSet::new();
        for cohort in &cohorts {
            for perspective in cohort {
                assert!(seen.insert(perspective.to_rir_code()));
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn uneven_groups_discard_the_tail() {
        let registry = registry(&[
            "arin.us-east-1",
            "ripe.eu-west-2",
            "ripe.eu-central-2",
            "apnic.ap-northeast-1",
            "apnic.ap-south-2",
        ]);
        let cohorts = build_cohorts(&registry, b"secret", "example.com", 2, true).unwrap();
        // Five perspectives in cohorts of two: two full cohorts, one discard.
        assert_eq!(cohorts.len(), 2);
        for cohort in &cohorts {
            let rirs: HashSet<_> = cohort.iter().map(|p| p.rir).collect();
            assert_eq!(rirs.len(), 2);
        }
    }
}
