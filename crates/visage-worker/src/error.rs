//! Worker error types.

use std::borrow::Cow;

/// Result type alias for worker operations.
pub type Result<T, E = WorkerError> = std::result::Result<T, E>;

/// Worker error type.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Failed to interact with the job queue.
    #[error("queue error: {0}")]
    Queue(#[from] visage_nats::Error),

    /// Source bytes could not be parsed as an image.
    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    /// The processed image could not be re-encoded.
    #[error("image encode failed: {0}")]
    Encode(#[source] image::ImageError),

    /// Object storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] visage_opendal::StorageError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] visage_postgres::PgError),

    /// Failed to process a job.
    #[error("job processing failed: {message}")]
    Processing {
        message: Cow<'static, str>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WorkerError {
    /// Creates a processing error with a message.
    pub fn processing(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Processing {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a processing error with a message and source.
    pub fn processing_with_source(
        message: impl Into<Cow<'static, str>>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns whether the failed job should be dropped instead of retried.
    ///
    /// Undecodable payloads and validation failures cannot be fixed by
    /// redelivery; storage and database failures can.
    pub fn is_terminal(&self) -> bool {
        match self {
            WorkerError::Decode(_) | WorkerError::Encode(_) => true,
            WorkerError::Queue(err) => err.is_terminal(),
            WorkerError::Storage(_) | WorkerError::Database(_) => false,
            WorkerError::Processing { .. } => false,
        }
    }
}
