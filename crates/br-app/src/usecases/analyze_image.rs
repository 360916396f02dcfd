use std::sync::{Arc, Mutex};

use bytes::Bytes;
use rand::RngCore;
use tracing::info;

use br_core::analysis::{synthesize_percentile, NewAnalysis};
use br_core::ids::UserId;
use br_core::ports::{AnalysisRepositoryPort, ClockPort, ObjectStoragePort};
use br_core::storage::ANALYSIS_IMAGE_DIR;

use crate::analyst_registry::AnalystRegistry;
use crate::errors::UseCaseError;
use crate::models::AnalysisView;
use crate::usecases::internal::ImageUrlResolver;

/// Upload an image, score it with one analyst and store the result.
pub struct AnalyzeImage {
    storage: Arc<dyn ObjectStoragePort>,
    registry: Arc<AnalystRegistry>,
    repo: Arc<dyn AnalysisRepositoryPort>,
    clock: Arc<dyn ClockPort>,
    urls: Arc<ImageUrlResolver>,
    percentile_rng: Mutex<Box<dyn RngCore + Send>>,
}

impl AnalyzeImage {
    pub fn new(
        storage: Arc<dyn ObjectStoragePort>,
        registry: Arc<AnalystRegistry>,
        repo: Arc<dyn AnalysisRepositoryPort>,
        clock: Arc<dyn ClockPort>,
        urls: Arc<ImageUrlResolver>,
        percentile_rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            storage,
            registry,
            repo,
            clock,
            urls,
            percentile_rng: Mutex::new(percentile_rng),
        }
    }

    /// Steps:
    /// 1. reject empty uploads
    /// 2. store bytes under `analysis/`
    /// 3. score with the registry's next analyst
    /// 4. persist with a synthesized percentile
    ///
    /// The stored object is never removed: it stays behind when scoring or
    /// persisting fails, and when the analysis is later deleted.
    #[tracing::instrument(
        name = "usecase.analyze_image.execute",
        skip(self, image),
        fields(user_id = %user_id, file_name = %file_name, size = image.len())
    )]
    pub async fn execute(
        &self,
        user_id: UserId,
        file_name: &str,
        image: Bytes,
    ) -> Result<AnalysisView, UseCaseError> {
        if image.is_empty() {
            return Err(UseCaseError::Validation("image is empty".to_string()));
        }
        if file_name.trim().is_empty() {
            return Err(UseCaseError::Validation("file name is required".to_string()));
        }

        let image_ref = self
            .storage
            .upload(image.len() as u64, ANALYSIS_IMAGE_DIR, file_name, image.clone())
            .await
            .map_err(UseCaseError::Storage)?;

        let tagged = self.registry.select_and_analyze(&image, &image_ref).await?;
        let analyst_name = tagged.analyst_name.clone();

        let percentile = {
            let mut rng = self
                .percentile_rng
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            synthesize_percentile(&mut *rng)
        };

        let new = NewAnalysis::from_report(
            user_id,
            image_ref,
            tagged,
            percentile,
            self.clock.now_ms(),
        );
        let record = self.repo.create(new).await?;

        info!(
            analysis_id = %record.id(),
            analyst = %analyst_name,
            score = record.score,
            "analysis stored"
        );

        let url = self.urls.resolve(&record.image_ref).await;
        Ok(AnalysisView::from_record(&record, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_clock, unsigned_storage, MockAnalyst, MockRepo};
    use crate::usecases::internal::ApiRoute;
    use br_core::analysis::{AnalystReport, AnalystType};
    use br_core::ids::AnalysisId;
    use br_core::ports::{AnalystError, AnalystPort};
    use br_core::storage::ObjectKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn route() -> ApiRoute {
        ApiRoute {
            host: "localhost:28084".to_string(),
            prefix: "/api".to_string(),
            version: "/v1".to_string(),
        }
    }

    fn registry_with(analyst: MockAnalyst) -> Arc<AnalystRegistry> {
        Arc::new(
            AnalystRegistry::new(
                vec![(Arc::new(analyst) as Arc<dyn AnalystPort>, 1)],
                StdRng::seed_from_u64(0),
            )
            .unwrap(),
        )
    }

    fn scoring_analyst() -> MockAnalyst {
        let mut analyst = MockAnalyst::new();
        analyst.expect_name().return_const("mock".to_string());
        analyst.expect_analyst_type().return_const(AnalystType::Mock);
        analyst.expect_analyze().returning(|_, _| {
            Ok(AnalystReport {
                score: 92,
                description: "radiant".to_string(),
                tags: vec!["sunny".to_string()],
                details: vec![],
            })
        });
        analyst
    }

    fn build(
        storage: crate::test_support::MockStorage,
        analyst: MockAnalyst,
        repo: MockRepo,
    ) -> AnalyzeImage {
        let storage: Arc<dyn ObjectStoragePort> = Arc::new(storage);
        AnalyzeImage::new(
            storage.clone(),
            registry_with(analyst),
            Arc::new(repo),
            Arc::new(fixed_clock(1_700_000_000_000)),
            Arc::new(ImageUrlResolver::new(storage, route())),
            Box::new(StdRng::seed_from_u64(9)),
        )
    }

    #[tokio::test]
    async fn stores_uploads_and_returns_view_with_proxied_url() {
        let mut storage = unsigned_storage();
        storage
            .expect_upload()
            .withf(|size, dir, name, data| {
                *size == 3 && dir == "analysis" && name == "face.png" && data.as_ref() == b"img"
            })
            .times(1)
            .returning(|_, _, _, _| Ok(ObjectKey::from("analysis/1-x.png")));

        let mut repo = MockRepo::new();
        repo.expect_create()
            .withf(|new| {
                new.user_id == UserId::new(5)
                    && new.score == 92
                    && new.analyst_type == AnalystType::Mock
                    && (80..100).contains(&new.percentile)
                    && new.created_at_ms == 1_700_000_000_000
            })
            .times(1)
            .returning(|new| Ok(new.into_persisted(AnalysisId::new(11))));

        let uc = build(storage, scoring_analyst(), repo);

        let view = uc
            .execute(UserId::new(5), "face.png", Bytes::from_static(b"img"))
            .await
            .unwrap();

        assert_eq!(view.id, 11);
        assert_eq!(view.score, 92);
        assert!(!view.is_favorite);
        assert_eq!(
            view.image_url,
            "http://localhost:28084/api/v1/analysis/image/analysis/1-x.png"
        );
    }

    #[tokio::test]
    async fn empty_image_is_rejected_before_upload() {
        let mut storage = unsigned_storage();
        storage.expect_upload().never();
        let mut repo = MockRepo::new();
        repo.expect_create().never();

        let uc = build(storage, scoring_analyst(), repo);

        let err = uc
            .execute(UserId::new(1), "face.png", Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_file_name_is_rejected() {
        let mut storage = unsigned_storage();
        storage.expect_upload().never();

        let uc = build(storage, scoring_analyst(), MockRepo::new());

        let err = uc
            .execute(UserId::new(1), "  ", Bytes::from_static(b"img"))
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    #[tokio::test]
    async fn analyst_failure_persists_nothing() {
        let mut storage = unsigned_storage();
        storage
            .expect_upload()
            .returning(|_, _, _, _| Ok(ObjectKey::from("analysis/1-x.png")));

        let mut analyst = MockAnalyst::new();
        analyst.expect_name().return_const("vision".to_string());
        analyst.expect_analyst_type().return_const(AnalystType::Ai);
        analyst
            .expect_analyze()
            .returning(|_, _| Err(AnalystError::InvalidResponse("no json".to_string())));

        let mut repo = MockRepo::new();
        repo.expect_create().never();

        let uc = build(storage, analyst, repo);

        let err = uc
            .execute(UserId::new(1), "face.png", Bytes::from_static(b"img"))
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::Analyst(_)));
    }

    #[tokio::test]
    async fn upload_failure_is_a_storage_error() {
        let mut storage = unsigned_storage();
        storage
            .expect_upload()
            .returning(|_, _, _, _| Err(anyhow::anyhow!("disk full")));

        let uc = build(storage, scoring_analyst(), MockRepo::new());

        let err = uc
            .execute(UserId::new(1), "face.png", Bytes::from_static(b"img"))
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::Storage(_)));
    }
}
