//! `mockall` doubles for the core ports, shared by the unit tests.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mockall::mock;

use br_core::analysis::{AnalysisResult, AnalystReport, AnalystType, NewAnalysis};
use br_core::ids::{AnalysisId, UserId};
use br_core::ports::{
    AnalysisRepositoryError, AnalysisRepositoryPort, AnalystError, AnalystPort, ClockPort,
    ObjectStoragePort,
};
use br_core::storage::ObjectKey;

mock! {
    pub Analyst {}

    #[async_trait]
    impl AnalystPort for Analyst {
        fn name(&self) -> &str;
        fn analyst_type(&self) -> AnalystType;
        async fn analyze(
            &self,
            image: &[u8],
            image_ref: &ObjectKey,
        ) -> Result<AnalystReport, AnalystError>;
    }
}

mock! {
    pub Repo {}

    #[async_trait]
    impl AnalysisRepositoryPort for Repo {
        async fn create(&self, new: NewAnalysis) -> Result<AnalysisResult, AnalysisRepositoryError>;
        async fn list_by_user(&self, user_id: UserId)
            -> Result<Vec<AnalysisResult>, AnalysisRepositoryError>;
        async fn list_favorites_by_user(&self, user_id: UserId)
            -> Result<Vec<AnalysisResult>, AnalysisRepositoryError>;
        async fn get_owned(&self, user_id: UserId, id: AnalysisId)
            -> Result<Option<AnalysisResult>, AnalysisRepositoryError>;
        async fn get_by_id(&self, id: AnalysisId)
            -> Result<Option<AnalysisResult>, AnalysisRepositoryError>;
        async fn update(&self, analysis: &AnalysisResult) -> Result<(), AnalysisRepositoryError>;
        async fn delete_owned(&self, user_id: UserId, id: AnalysisId)
            -> Result<usize, AnalysisRepositoryError>;
    }
}

mock! {
    pub Storage {}

    #[async_trait]
    impl ObjectStoragePort for Storage {
        async fn upload(&self, size_hint: u64, dir: &str, name: &str, data: Bytes)
            -> anyhow::Result<ObjectKey>;
        async fn fetch(&self, key: &ObjectKey) -> anyhow::Result<Bytes>;
        async fn presign(&self, key: &ObjectKey, ttl: Duration) -> anyhow::Result<Option<String>>;
    }
}

mock! {
    pub Clock {}

    impl ClockPort for Clock {
        fn now_ms(&self) -> i64;
    }
}

/// A clock frozen at `ms`.
pub fn fixed_clock(ms: i64) -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_now_ms().return_const(ms);
    clock
}

/// Storage that cannot presign, so URLs fall back to the proxied form.
pub fn unsigned_storage() -> MockStorage {
    let mut storage = MockStorage::new();
    storage.expect_presign().returning(|_, _| Ok(None));
    storage
}

pub fn sample_record(id: i64, user: i64) -> AnalysisResult {
    NewAnalysis {
        user_id: UserId::new(user),
        image_ref: ObjectKey::from("analysis/1700000000000-abc.png"),
        score: 90,
        percentile: 85,
        description: "bright and balanced".to_string(),
        tags: vec!["calm".to_string(), "warm".to_string()],
        score_details: vec![],
        analyst_type: AnalystType::Mock,
        created_at_ms: 1_700_000_000_000,
    }
    .into_persisted(AnalysisId::new(id))
}
