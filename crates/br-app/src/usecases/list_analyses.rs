use std::sync::Arc;

use futures::future::join_all;
use tracing::info;

use br_core::analysis::AnalysisResult;
use br_core::ids::UserId;
use br_core::ports::AnalysisRepositoryPort;

use crate::errors::UseCaseError;
use crate::models::AnalysisView;
use crate::usecases::internal::ImageUrlResolver;

/// Which of a user's analyses to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisFilter {
    All,
    FavoritesOnly,
}

/// A user's analyses, newest first, with fetchable image URLs.
pub struct ListAnalyses {
    repo: Arc<dyn AnalysisRepositoryPort>,
    urls: Arc<ImageUrlResolver>,
}

impl ListAnalyses {
    pub fn new(repo: Arc<dyn AnalysisRepositoryPort>, urls: Arc<ImageUrlResolver>) -> Self {
        Self { repo, urls }
    }

    #[tracing::instrument(
        name = "usecase.list_analyses.execute",
        skip(self),
        fields(user_id = %user_id, filter = ?filter)
    )]
    pub async fn execute(
        &self,
        user_id: UserId,
        filter: AnalysisFilter,
    ) -> Result<Vec<AnalysisView>, UseCaseError> {
        let records = match filter {
            AnalysisFilter::All => self.repo.list_by_user(user_id).await?,
            AnalysisFilter::FavoritesOnly => self.repo.list_favorites_by_user(user_id).await?,
        };

        info!(count = records.len(), "listed analyses");

        Ok(join_all(records.iter().map(|record| self.to_view(record))).await)
    }

    async fn to_view(&self, record: &AnalysisResult) -> AnalysisView {
        let url = self.urls.resolve(&record.image_ref).await;
        AnalysisView::from_record(record, url)
    }
}
