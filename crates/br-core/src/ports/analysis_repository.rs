use async_trait::async_trait;

use crate::{
    analysis::{AnalysisResult, NewAnalysis},
    ids::{AnalysisId, UserId},
    ports::errors::AnalysisRepositoryError,
};

/// Persistence of analysis results.
///
/// Every owner-scoped query is keyed by `(user_id, id)`; only `get_by_id`
/// ignores ownership and exists for share-token resolution.
#[async_trait]
pub trait AnalysisRepositoryPort: Send + Sync {
    /// 保存新记录，由存储层分配 id
    async fn create(&self, new: NewAnalysis) -> Result<AnalysisResult, AnalysisRepositoryError>;

    /// 用户的全部记录，最新的在前
    async fn list_by_user(&self, user_id: UserId)
        -> Result<Vec<AnalysisResult>, AnalysisRepositoryError>;

    async fn list_favorites_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AnalysisResult>, AnalysisRepositoryError>;

    async fn get_owned(
        &self,
        user_id: UserId,
        id: AnalysisId,
    ) -> Result<Option<AnalysisResult>, AnalysisRepositoryError>;

    async fn get_by_id(&self, id: AnalysisId)
        -> Result<Option<AnalysisResult>, AnalysisRepositoryError>;

    /// Persist the mutable fields of an existing record.
    async fn update(&self, analysis: &AnalysisResult) -> Result<(), AnalysisRepositoryError>;

    /// Returns the number of rows removed; 0 when absent or not owned.
    async fn delete_owned(
        &self,
        user_id: UserId,
        id: AnalysisId,
    ) -> Result<usize, AnalysisRepositoryError>;
}
