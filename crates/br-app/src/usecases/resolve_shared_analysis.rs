use std::sync::Arc;

use tracing::info;

use br_core::ports::AnalysisRepositoryPort;
use br_core::security::{ShareToken, ShareTokenCodec};

use crate::errors::UseCaseError;
use crate::models::AnalysisView;
use crate::usecases::internal::ImageUrlResolver;

/// Read one analysis through a share token, without an ownership check.
pub struct ResolveSharedAnalysis {
    repo: Arc<dyn AnalysisRepositoryPort>,
    codec: Arc<ShareTokenCodec>,
    urls: Arc<ImageUrlResolver>,
}

impl ResolveSharedAnalysis {
    pub fn new(
        repo: Arc<dyn AnalysisRepositoryPort>,
        codec: Arc<ShareTokenCodec>,
        urls: Arc<ImageUrlResolver>,
    ) -> Self {
        Self { repo, codec, urls }
    }

    #[tracing::instrument(
        name = "usecase.resolve_shared_analysis.execute",
        skip(self, token),
        fields(analysis_id = %token.detail_id)
    )]
    pub async fn execute(&self, token: &ShareToken) -> Result<AnalysisView, UseCaseError> {
        let id = self.codec.verify(token)?;

        let record = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(UseCaseError::NotFound)?;

        info!("shared analysis resolved");

        let url = self.urls.resolve(&record.image_ref).await;
        Ok(AnalysisView::from_record(&record, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_clock, sample_record, unsigned_storage, MockRepo};
    use crate::usecases::internal::ApiRoute;
    use br_core::ids::AnalysisId;
    use br_core::security::{ShareSecret, ShareTokenError, SHARE_TOKEN_TTL};

    fn build(repo: MockRepo, now_ms: i64) -> (ResolveSharedAnalysis, Arc<ShareTokenCodec>) {
        let codec = Arc::new(ShareTokenCodec::new(
            ShareSecret::from_passphrase("k"),
            Arc::new(fixed_clock(now_ms)),
        ));
        let urls = Arc::new(ImageUrlResolver::new(
            Arc::new(unsigned_storage()),
            ApiRoute {
                host: "h".to_string(),
                prefix: "".to_string(),
                version: "".to_string(),
            },
        ));
        (
            ResolveSharedAnalysis::new(Arc::new(repo), codec.clone(), urls),
            codec,
        )
    }

    #[tokio::test]
    async fn valid_token_reads_record_of_any_owner() {
        let mut repo = MockRepo::new();
        repo.expect_get_owned().never();
        repo.expect_get_by_id()
            .withf(|id| *id == AnalysisId::new(42))
            .returning(|id| Ok(Some(sample_record(id.get(), 77))));

        let (uc, codec) = build(repo, 5_000);
        let token = codec.sign(AnalysisId::new(42), SHARE_TOKEN_TTL);

        let view = uc.execute(&token).await.unwrap();

        assert_eq!(view.id, 42);
        assert_eq!(view.user_id, 77);
    }

    #[tokio::test]
    async fn tampered_token_never_reaches_repository() {
        let mut repo = MockRepo::new();
        repo.expect_get_by_id().never();

        let (uc, codec) = build(repo, 5_000);
        let mut token = codec.sign(AnalysisId::new(42), SHARE_TOKEN_TTL);
        token.detail_id = AnalysisId::new(43);

        let err = uc.execute(&token).await.unwrap_err();

        assert!(matches!(
            err,
            UseCaseError::ShareToken(ShareTokenError::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn deleted_record_is_not_found() {
        let mut repo = MockRepo::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let (uc, codec) = build(repo, 5_000);
        let token = codec.sign(AnalysisId::new(1), SHARE_TOKEN_TTL);

        let err = uc.execute(&token).await.unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound));
    }
}
