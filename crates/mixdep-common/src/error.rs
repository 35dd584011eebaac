//! Unified error types for the mixdep workspace.
//!
//! All failures are programmer-visible configuration errors detected
//! synchronously; there are no transient conditions and no retries.

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum MixdepError {
    /// A referenced alias has no registry entry.
    #[error("unknown mixin alias: \"{alias}\"")]
    UnknownAlias {
        /// The alias that could not be resolved.
        alias: String,
    },

    /// The dependency graph reached from a reference contains a cycle.
    #[error("circular mixin dependency: {}", .path.join(" -> "))]
    CircularDependency {
        /// The aliases forming the cycle, in walk order, with the
        /// repeated alias appearing at both ends.
        path: Vec<String>,
    },

    /// A call-style reference string has unbalanced or invalid syntax.
    #[error("malformed mixin reference \"{reference}\": {message}")]
    MalformedReference {
        /// The reference string as supplied by the caller.
        reference: String,
        /// Description of the syntax problem.
        message: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, MixdepError>;
