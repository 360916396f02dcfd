use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

use crate::storage::ObjectKey;

#[async_trait]
pub trait ObjectStoragePort: Send + Sync {
    // 把 bytes 写入 `dir` 下，返回对象 key
    async fn upload(&self, size_hint: u64, dir: &str, name: &str, data: Bytes) -> Result<ObjectKey>;

    // 读取对象内容
    async fn fetch(&self, key: &ObjectKey) -> Result<Bytes>;

    /// Time-limited direct download link, `None` when the backend cannot
    /// issue one.
    async fn presign(&self, key: &ObjectKey, ttl: Duration) -> Result<Option<String>>;
}

#[async_trait]
impl<T: ObjectStoragePort + ?Sized> ObjectStoragePort for Arc<T> {
    async fn upload(&self, size_hint: u64, dir: &str, name: &str, data: Bytes) -> Result<ObjectKey> {
        (**self).upload(size_hint, dir, name, data).await
    }

    async fn fetch(&self, key: &ObjectKey) -> Result<Bytes> {
        (**self).fetch(key).await
    }

    async fn presign(&self, key: &ObjectKey, ttl: Duration) -> Result<Option<String>> {
        (**self).presign(key, ttl).await
    }
}
