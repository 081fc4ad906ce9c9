//! # Container Error Types
//!
//! All errors that can occur while building or growing a container.
//!
//! A missing key is not an error: lookups report it through `Option` or `bool`.

use thiserror::Error;

/// Errors that can occur in the container layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// A hash table was requested with no buckets.
    #[error("bucket count must be at least 1")]
    ZeroBuckets,

    /// The allocator could not provide memory for the requested elements.
    #[error("allocation failed: could not reserve {requested} elements")]
    AllocationFailed {
        /// Number of elements that were being reserved.
        requested: usize,
    },

    /// Invalid configuration file contents.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be read.
    #[error("could not read configuration file {path}: {reason}")]
    ConfigRead {
        /// Path that was being read.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },
}

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
