//! Single entry point for callers of the analysis service.
//!
//! Every method runs one use case, logs the detailed failure and returns the
//! coarse [`ServiceError`].

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::AsyncWrite;
use tracing::{error, warn};

use br_core::ids::{AnalysisId, UserId};
use br_core::security::ShareToken;
use br_core::storage::ObjectKey;

use crate::deps::AppDeps;
use crate::errors::{ServiceError, UseCaseError};
use crate::models::AnalysisView;
use crate::usecases::internal::ImageUrlResolver;
use crate::usecases::{
    AnalysisFilter, AnalyzeImage, DeleteAnalysis, GetAnalysisImage, ListAnalyses,
    ResolveSharedAnalysis, SetFavorite, ShareAnalysis,
};

pub struct AnalysisOrchestrator {
    analyze: AnalyzeImage,
    list: ListAnalyses,
    set_favorite: SetFavorite,
    delete: DeleteAnalysis,
    share: ShareAnalysis,
    resolve_share: ResolveSharedAnalysis,
    image: GetAnalysisImage,
}

impl AnalysisOrchestrator {
    pub fn new(deps: AppDeps) -> Self {
        let AppDeps {
            analysis_repo,
            object_storage,
            api_route,
            analysts,
            percentile_rng,
            share_codec,
            clock,
        } = deps;

        let urls = Arc::new(ImageUrlResolver::new(object_storage.clone(), api_route));

        Self {
            analyze: AnalyzeImage::new(
                object_storage.clone(),
                analysts,
                analysis_repo.clone(),
                clock,
                urls.clone(),
                percentile_rng,
            ),
            list: ListAnalyses::new(analysis_repo.clone(), urls.clone()),
            set_favorite: SetFavorite::new(analysis_repo.clone()),
            delete: DeleteAnalysis::new(analysis_repo.clone()),
            share: ShareAnalysis::new(analysis_repo.clone(), share_codec.clone()),
            resolve_share: ResolveSharedAnalysis::new(analysis_repo, share_codec, urls),
            image: GetAnalysisImage::new(object_storage),
        }
    }

    pub async fn analyze(
        &self,
        user_id: UserId,
        file_name: &str,
        image: Bytes,
    ) -> Result<AnalysisView, ServiceError> {
        authenticated(user_id)?;
        self.analyze
            .execute(user_id, file_name, image)
            .await
            .map_err(|e| report("analyze", e))
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<AnalysisView>, ServiceError> {
        authenticated(user_id)?;
        self.list
            .execute(user_id, AnalysisFilter::All)
            .await
            .map_err(|e| report("list", e))
    }

    pub async fn favorites(&self, user_id: UserId) -> Result<Vec<AnalysisView>, ServiceError> {
        authenticated(user_id)?;
        self.list
            .execute(user_id, AnalysisFilter::FavoritesOnly)
            .await
            .map_err(|e| report("favorites", e))
    }

    pub async fn favorite(&self, user_id: UserId, id: AnalysisId) -> Result<(), ServiceError> {
        authenticated(user_id)?;
        self.set_favorite
            .execute(user_id, id, true)
            .await
            .map_err(|e| report("favorite", e))
    }

    pub async fn unfavorite(&self, user_id: UserId, id: AnalysisId) -> Result<(), ServiceError> {
        authenticated(user_id)?;
        self.set_favorite
            .execute(user_id, id, false)
            .await
            .map_err(|e| report("unfavorite", e))
    }

    pub async fn delete(&self, user_id: UserId, id: AnalysisId) -> Result<(), ServiceError> {
        authenticated(user_id)?;
        self.delete
            .execute(user_id, id)
            .await
            .map_err(|e| report("delete", e))
    }

    pub async fn share(&self, user_id: UserId, id: AnalysisId) -> Result<ShareToken, ServiceError> {
        authenticated(user_id)?;
        self.share
            .execute(user_id, id)
            .await
            .map_err(|e| report("share", e))
    }

    /// Resolve a token in its query-string form. Needs no authenticated user.
    pub async fn resolve_share(&self, raw_token: &str) -> Result<AnalysisView, ServiceError> {
        let token: ShareToken = raw_token
            .parse()
            .map_err(|e| report("resolve_share", UseCaseError::ShareToken(e)))?;

        self.resolve_share
            .execute(&token)
            .await
            .map_err(|e| report("resolve_share", e))
    }

    /// Stream a stored image. Requires a signed-in caller, like every other
    /// route except share resolution.
    pub async fn image<W>(
        &self,
        user_id: UserId,
        key: &ObjectKey,
        sink: &mut W,
    ) -> Result<u64, ServiceError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        authenticated(user_id)?;
        self.image
            .execute(key, sink)
            .await
            .map_err(|e| report("image", e))
    }
}

/// The identity provider hands over positive ids only.
fn authenticated(user_id: UserId) -> Result<(), ServiceError> {
    if user_id.get() <= 0 {
        warn!(user_id = %user_id, "request without an authenticated user");
        return Err(ServiceError::Unauthorized);
    }
    Ok(())
}

fn report(operation: &'static str, err: UseCaseError) -> ServiceError {
    match &err {
        UseCaseError::Validation(_) | UseCaseError::NotFound | UseCaseError::ShareToken(_) => {
            warn!(operation, error = %err, "request rejected");
        }
        _ => {
            error!(operation, error = ?err, "request failed");
        }
    }
    ServiceError::from(err)
}
