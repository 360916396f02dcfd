use std::sync::Arc;

use tracing::info;

use br_core::ids::{AnalysisId, UserId};
use br_core::ports::AnalysisRepositoryPort;

use crate::errors::UseCaseError;

/// Mark or unmark one of the caller's analyses as favorite.
pub struct SetFavorite {
    repo: Arc<dyn AnalysisRepositoryPort>,
}

impl SetFavorite {
    pub fn new(repo: Arc<dyn AnalysisRepositoryPort>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(
        name = "usecase.set_favorite.execute",
        skip(self),
        fields(user_id = %user_id, analysis_id = %id, favorite)
    )]
    pub async fn execute(
        &self,
        user_id: UserId,
        id: AnalysisId,
        favorite: bool,
    ) -> Result<(), UseCaseError> {
        let mut record = self
            .repo
            .get_owned(user_id, id)
            .await?
            .ok_or(UseCaseError::NotFound)?;

        if favorite {
            record.mark_favorite();
        } else {
            record.unmark_favorite();
        }

        self.repo.update(&record).await?;

        info!("favorite flag updated");
        Ok(())
    }
}
