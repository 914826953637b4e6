// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # MPIC Types
//!
//! This crate is the foundational library for the MPIC coordinator, containing
//! all core data structures, error types, and configuration objects.
//!
//! ## Architectural Role
//!
//! As the base crate, `mpic-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. This structure prevents
//! circular dependencies and provides a stable, canonical definition for
//! shared types like `RemotePerspective`, the `check_type`-tagged request and
//! response unions, and the validation issue keys.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::ConfigError> = std::result::Result<T, E>;

/// Check-level request and parameter types (`CheckRequest`, CAA/DCV parameters).
pub mod check;
/// Shared configuration structures (`CoordinatorConfig`, `CaaCheckerConfig`).
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;
/// Aggregate MPIC request and response unions and orchestration parameters.
pub mod mpic;
/// The perspective model: RIR tags and `<rir>.<code>` wire forms.
pub mod perspective;
/// Check-level response types (`CheckResponse` and its details).
pub mod response;
