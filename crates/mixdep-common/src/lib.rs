//! # mixdep-common
//!
//! Shared error definitions and the literal value type used across the
//! mixdep workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the foundational primitives that all other
//! crates build upon.

pub mod error;
pub mod types;
