//! Service initialization errors.

/// Result type alias for service initialization.
pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// Errors raised while building the application state.
///
/// All of these are fatal at startup: the process should exit rather
/// than serve requests with broken dependencies.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database client could not be initialized.
    #[error("database error: {0}")]
    Postgres(#[from] visage_postgres::PgError),

    /// NATS connection could not be established.
    #[error("queue error: {0}")]
    Nats(#[from] visage_nats::Error),

    /// Key material could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Key material could not be parsed.
    #[error("invalid key material: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),
}

impl ServiceError {
    /// Creates a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }
}
