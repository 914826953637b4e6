// Path: crates/coordinator/src/quorum.rs
//! Quorum evaluation over a cohort's responses.

use mpic_types::response::CheckResponse;

/// The default quorum applied when a request omits `quorum_count`.
///
/// The table covers the perspective counts production deployments run with.
/// Counts outside it must state their quorum explicitly; inventing a floor
/// here would silently weaken (or over-tighten) corroboration.
pub(crate) fn quorum_floor(perspective_count: u32) -> Option<u32> {
    match perspective_count {
        4 => Some(3),
        5 => Some(4),
        6 => Some(4),
        7 => Some(5),
        8 => Some(5),
        _ => None,
    }
}

/// Order-independent quorum predicate: did at least `quorum_count`
/// perspectives report a passing check?
pub(crate) fn evaluate(responses: &[CheckResponse], quorum_count: u32) -> bool {
    let passed = responses.iter().filter(|r| r.check_passed).count();
    passed as u32 >= quorum_count
}
