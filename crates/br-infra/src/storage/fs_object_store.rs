use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use br_core::ports::{ClockPort, ObjectStoragePort};
use br_core::storage::ObjectKey;

/// Object storage on the local filesystem.
///
/// Objects live at `<root>/<dir>/<unix_ms>-<uuid><ext>`; the key is the part
/// after `<root>/`. Presigned links are not supported, callers fall back to
/// the API's image proxy.
pub struct FsObjectStore {
    root: PathBuf,
    clock: Arc<dyn ClockPort>,
}

impl FsObjectStore {
    pub fn new(root: PathBuf, clock: Arc<dyn ClockPort>) -> Self {
        Self { root, clock }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_name(&self, original: &str) -> String {
        let ext = Path::new(original)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();
        format!("{}-{}{}", self.clock.now_ms(), uuid::Uuid::new_v4(), ext)
    }

    /// Resolve a key below the root, rejecting anything that could escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty() || key.contains('\\') {
            bail!("invalid object key: {:?}", key);
        }
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            bail!("object key must be a relative path without '..': {:?}", key);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStoragePort for FsObjectStore {
    async fn upload(&self, size_hint: u64, dir: &str, name: &str, data: Bytes) -> Result<ObjectKey> {
        let key = format!("{}/{}", dir, self.object_name(name));
        let path = self.resolve(&key)?;

        if size_hint != data.len() as u64 {
            debug!(size_hint, actual = data.len(), "upload size differs from hint");
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&path, &data)
            .await
            .with_context(|| format!("write object {}", path.display()))?;

        debug!(key = %key, bytes = data.len(), "object stored");
        Ok(ObjectKey::new(key))
    }

    async fn fetch(&self, key: &ObjectKey) -> Result<Bytes> {
        let path = self.resolve(key.as_str())?;
        let data = fs::read(&path)
            .await
            .with_context(|| format!("read object {}", key))?;
        Ok(Bytes::from(data))
    }

    async fn presign(&self, _key: &ObjectKey, _ttl: Duration) -> Result<Option<String>> {
        Ok(None)
    }
}
