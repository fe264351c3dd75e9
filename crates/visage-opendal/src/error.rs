//! Storage error types.

/// Result type for storage operations.
pub type StorageResult<T, E = StorageError> = std::result::Result<T, E>;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Backend initialization failed.
    #[error("storage initialization failed: {0}")]
    Init(String),

    /// Invalid storage configuration.
    #[error("invalid storage configuration: {0}")]
    Config(String),

    /// An underlying OpenDAL operation failed.
    #[error("storage operation failed: {0}")]
    Operation(#[from] opendal::Error),
}

impl StorageError {
    /// Creates an initialization error.
    pub fn init(reason: impl Into<String>) -> Self {
        Self::Init(reason.into())
    }

    /// Creates a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Returns whether the error indicates a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::Operation(err) if err.kind() == opendal::ErrorKind::NotFound
        )
    }
}
