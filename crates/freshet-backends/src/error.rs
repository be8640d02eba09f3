//! Error types for the execution substrate

use std::fmt;

/// Result type for substrate operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur inside the execution substrate
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Invalid buffer handle
    #[error("invalid buffer handle: {0}")]
    InvalidBufferHandle(u64),

    /// Buffer access out of bounds
    #[error("buffer access out of bounds: offset {offset} + size {size} > buffer size {buffer_size}")]
    BufferOutOfBounds {
        offset: usize,
        size: usize,
        buffer_size: usize,
    },

    /// Array shapes do not line up for a copy or a launch
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Slab allocation failed
    #[error("allocation failed: requested {requested} bytes")]
    AllocationFailed { requested: usize },

    /// Invalid launch configuration
    #[error("invalid launch configuration: {0}")]
    InvalidLaunchConfig(String),

    /// Synchronization failure at a post-launch barrier
    #[error("synchronization failed: {0}")]
    SyncFailed(String),

    /// Execution error
    #[error("execution error: {0}")]
    ExecutionError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Create an invalid launch configuration error
    pub fn invalid_launch(msg: impl fmt::Display) -> Self {
        Self::InvalidLaunchConfig(msg.to_string())
    }

    /// Create an execution error
    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::ExecutionError(msg.into())
    }
}
