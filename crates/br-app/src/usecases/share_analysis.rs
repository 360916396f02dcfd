use std::sync::Arc;

use tracing::info;

use br_core::ids::{AnalysisId, UserId};
use br_core::ports::AnalysisRepositoryPort;
use br_core::security::{ShareToken, ShareTokenCodec, SHARE_TOKEN_TTL};

use crate::errors::UseCaseError;

/// Issue a 24h share token for one of the caller's analyses.
pub struct ShareAnalysis {
    repo: Arc<dyn AnalysisRepositoryPort>,
    codec: Arc<ShareTokenCodec>,
}

impl ShareAnalysis {
    pub fn new(repo: Arc<dyn AnalysisRepositoryPort>, codec: Arc<ShareTokenCodec>) -> Self {
        Self { repo, codec }
    }

    #[tracing::instrument(
        name = "usecase.share_analysis.execute",
        skip(self),
        fields(user_id = %user_id, analysis_id = %id)
    )]
    pub async fn execute(&self, user_id: UserId, id: AnalysisId) -> Result<ShareToken, UseCaseError> {
        self.repo
            .get_owned(user_id, id)
            .await?
            .ok_or(UseCaseError::NotFound)?;

        let token = self.codec.sign(id, SHARE_TOKEN_TTL);

        info!(expires_at = token.expires_at, "share token issued");
        Ok(token)
    }
}
