use async_trait::async_trait;

use crate::analysis::{AnalystReport, AnalystType};
use crate::ports::errors::AnalystError;
use crate::storage::ObjectKey;

/// 评分后端：对一张图片给出分数、描述与标签。
#[async_trait]
pub trait AnalystPort: Send + Sync {
    fn name(&self) -> &str;

    fn analyst_type(&self) -> AnalystType;

    /// `image_ref` is the key the bytes were stored under; backends use it
    /// only as a hint (e.g. for the mime type).
    async fn analyze(
        &self,
        image: &[u8],
        image_ref: &ObjectKey,
    ) -> Result<AnalystReport, AnalystError>;
}
