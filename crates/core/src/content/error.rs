//! Content attachment error types.

use haven_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;

/// Attachment reconciliation errors.
///
/// Any of these aborts the slot whose transaction is open when it occurs.
#[derive(Debug, Error)]
pub enum ContentError {
    /// An inline upload is not a valid base64 data URI.
    #[error("malformed inline payload: {0}")]
    Decode(String),

    /// Object storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository or transaction operation failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Document preview could not be resolved.
    #[error("preview error: {0}")]
    Preview(String),

    /// Record body does not have the expected shape.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Two slots of one parent entity share a column name.
    #[error("duplicate attachment slot column: {0}")]
    DuplicateSlot(String),

    /// No slots are registered for this parent entity.
    #[error("unknown content entity: {0}")]
    UnknownEntity(String),

    /// A blocking worker task did not complete.
    #[error("background task failed: {0}")]
    Task(String),
}

impl ContentError {
    /// Create a decode error.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a persistence error.
    #[must_use]
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create an invalid payload error.
    #[must_use]
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match &err {
            ContentError::Decode(_) | ContentError::InvalidPayload(_) => {
                Self::Validation(err.to_string())
            }
            ContentError::UnknownEntity(_) => Self::NotFound(err.to_string()),
            ContentError::Storage(_) | ContentError::Preview(_) => {
                Self::ExternalService(err.to_string())
            }
            ContentError::Persistence(_) => Self::Database(err.to_string()),
            ContentError::DuplicateSlot(_) => Self::Configuration(err.to_string()),
            ContentError::Task(_) => Self::Internal(err.to_string()),
        }
    }
}
