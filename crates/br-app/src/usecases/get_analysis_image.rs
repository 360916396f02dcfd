use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use br_core::ports::ObjectStoragePort;
use br_core::storage::{ObjectKey, ANALYSIS_IMAGE_DIR};

use crate::errors::UseCaseError;

/// Copy a stored analysis image to `sink`. Backs the proxied image URL.
pub struct GetAnalysisImage {
    storage: Arc<dyn ObjectStoragePort>,
}

impl GetAnalysisImage {
    pub fn new(storage: Arc<dyn ObjectStoragePort>) -> Self {
        Self { storage }
    }

    /// Returns the number of bytes written.
    #[tracing::instrument(
        name = "usecase.get_analysis_image.execute",
        skip(self, sink),
        fields(key = %key)
    )]
    pub async fn execute<W>(&self, key: &ObjectKey, sink: &mut W) -> Result<u64, UseCaseError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        // only analysis images are reachable through this route
        let in_dir = key
            .as_str()
            .strip_prefix(ANALYSIS_IMAGE_DIR)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|name| !name.is_empty());
        if !in_dir {
            return Err(UseCaseError::Validation(format!(
                "image key must be under {}/",
                ANALYSIS_IMAGE_DIR
            )));
        }

        let data = self.storage.fetch(key).await.map_err(UseCaseError::Storage)?;

        sink.write_all(&data)
            .await
            .map_err(|e| UseCaseError::Storage(anyhow::Error::new(e).context("write image")))?;
        sink.flush()
            .await
            .map_err(|e| UseCaseError::Storage(anyhow::Error::new(e).context("flush image")))?;

        debug!(bytes = data.len(), "image streamed");
        Ok(data.len() as u64)
    }
}
