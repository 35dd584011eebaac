//! # mixdep-core
//!
//! Mixin registry with dependency-aware resolution.
//!
//! Handles:
//! - **Parser**: Call-style reference strings (`"paginate(25, true)"`)
//!   parsed into an alias plus literal arguments.
//! - **Registry**: Alias-keyed registration of mixins, dynamic mixin
//!   factories, grouping aliases, and dependency declarations.
//! - **Resolver**: Expansion of a reference list into a flat,
//!   deduplicated, dependency-ordered list of concrete mixins.
//! - **Graph**: Whole-registry dependency validation and topological
//!   ordering.

pub mod graph;
pub mod parser;
pub mod registry;
pub mod resolver;
