use std::error::Error;
use thiserror::Error;

/// Result alias for content-store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by content-store backends regardless of the underlying service.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("content store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
