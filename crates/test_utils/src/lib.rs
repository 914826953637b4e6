// Path: crates/test_utils/src/lib.rs
#![cfg_attr(not(test), deny(clippy::unimplemented, clippy::todo))]

//! # MPIC Test Utilities
//!
//! Ready-made valid requests and scripted remote-perspective doubles for
//! testing the coordinator without a network.

pub mod remote;
pub mod requests;
