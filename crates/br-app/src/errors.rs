//! Error types of the application layer.
//!
//! Use cases report a detailed [`UseCaseError`]. The orchestrator logs it and
//! hands callers only the coarse [`ServiceError`].

use thiserror::Error;

use br_core::ports::AnalysisRepositoryError;
use br_core::security::ShareTokenError;

use crate::analyst_registry::RegistryError;

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("analysis not found")]
    NotFound,

    #[error("object storage failed: {0:#}")]
    Storage(anyhow::Error),

    #[error(transparent)]
    Repository(#[from] AnalysisRepositoryError),

    #[error(transparent)]
    Analyst(#[from] RegistryError),

    #[error(transparent)]
    ShareToken(#[from] ShareTokenError),
}

/// Client-facing error categories. `Display` never includes internal causes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("analysis not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("analysis service is temporarily unavailable")]
    BackendFailure,

    #[error("share link is invalid or has expired")]
    ShareTokenInvalid,
}

impl From<UseCaseError> for ServiceError {
    fn from(err: UseCaseError) -> Self {
        match err {
            UseCaseError::Validation(msg) => ServiceError::Validation(msg),
            UseCaseError::NotFound | UseCaseError::Repository(AnalysisRepositoryError::NotFound) => {
                ServiceError::NotFound
            }
            UseCaseError::ShareToken(_) => ServiceError::ShareTokenInvalid,
            UseCaseError::Storage(_)
            | UseCaseError::Repository(AnalysisRepositoryError::Storage(_))
            | UseCaseError::Analyst(_) => ServiceError::BackendFailure,
        }
    }
}
