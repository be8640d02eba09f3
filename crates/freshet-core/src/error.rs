//! Error types for benchmark runs

use freshet_backends::BackendError;

/// Result type for benchmark operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a benchmark run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Execution substrate failure (allocation, launch, copy, fence)
    #[error("backend failure: {0}")]
    Backend(#[from] BackendError),

    /// Run parameters outside the supported domain
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
