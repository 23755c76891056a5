//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::traits::SourceError;

/// Infrastructure errors wrap application errors and add output encoding.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<SourceError> for InfraError {
    fn from(e: SourceError) -> Self {
        Self::Application(ApplicationError::Source(e))
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
