//! Error types for depscope operations.
//!
//! Errors come in two tiers:
//!
//! - **`SourceError`**: a single package lookup failed. The graph builder
//!   catches these at the node boundary, records them, and keeps going.
//! - **`Error`**: failures that abort the run (bad configuration, reverse
//!   analysis against a source that cannot list its packages, unreadable
//!   fixtures).
//!
//! A detected dependency cycle is not an error; it is recorded on the
//! resulting [`DependencyGraph`](crate::domain::DependencyGraph).

use std::io;
use thiserror::Error;

/// Failure to fetch the dependencies of one package.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The source has no record of the package.
    #[error("package not found: {0}")]
    NotFound(String),

    /// The lookup failed for a reason that may not persist (network, server).
    #[error("transient failure: {0}")]
    Transient(String),

    /// Package metadata could not be parsed.
    #[error("malformed package metadata: {0}")]
    Parse(String),

    /// Local fixture data could not be read.
    #[error("fixture I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

/// The error type for depscope operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or contradictory configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested analysis is not possible with the selected source.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A package source failed outside of per-node traversal.
    #[error("Package source error: {0}")]
    Source(#[from] SourceError),

    /// Level analysis found a cycle in a graph assumed to be acyclic.
    #[error("Dependency graph contains a cycle through '{package}'")]
    CyclicGraph {
        /// A package taking part in the cycle.
        package: String,
    },
}

/// A specialized Result type for depscope operations.
pub type Result<T> = std::result::Result<T, Error>;
