//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::traits::BackendError;

/// Infrastructure errors wrap application errors and add backend I/O concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Reader/writer failure, passed through untouched
    #[error(transparent)]
    Backend(BackendError),

    #[error("no backend registered for: {0}")]
    NoBackend(String),
}

impl InfraError {
    /// The backend's own error, if this is one.
    pub fn backend_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            InfraError::Backend(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
