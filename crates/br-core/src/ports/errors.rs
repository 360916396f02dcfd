use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisRepositoryError {
    #[error("analysis not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum AnalystError {
    /// Transport or upstream service failure.
    #[error("analyst backend unavailable: {0}")]
    Backend(String),

    /// Upstream answered, but not with a usable report.
    #[error("analyst returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("image rejected by analyst: {0}")]
    InvalidImage(String),
}
