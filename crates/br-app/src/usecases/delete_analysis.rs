use std::sync::Arc;

use tracing::info;

use br_core::ids::{AnalysisId, UserId};
use br_core::ports::AnalysisRepositoryPort;

use crate::errors::UseCaseError;

/// Delete one of the caller's analyses.
pub struct DeleteAnalysis {
    repo: Arc<dyn AnalysisRepositoryPort>,
}

impl DeleteAnalysis {
    pub fn new(repo: Arc<dyn AnalysisRepositoryPort>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(
        name = "usecase.delete_analysis.execute",
        skip(self),
        fields(user_id = %user_id, analysis_id = %id)
    )]
    pub async fn execute(&self, user_id: UserId, id: AnalysisId) -> Result<(), UseCaseError> {
        let removed = self.repo.delete_owned(user_id, id).await?;
        if removed == 0 {
            return Err(UseCaseError::NotFound);
        }

        info!("analysis deleted");
        Ok(())
    }
}
