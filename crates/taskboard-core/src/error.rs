use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskboardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskboardError {
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {} does not exist", kind, id))
    }

    /// Whether re-running the operation against fresh state may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Errors raised by the storage layer rather than by the request itself.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Io(_) | Self::Serialization(_) | Self::Internal(_)
        )
    }
}
