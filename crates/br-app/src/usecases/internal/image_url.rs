use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use br_core::ports::ObjectStoragePort;
use br_core::storage::ObjectKey;

/// Lifetime of presigned image links.
pub const PRESIGN_TTL: Duration = Duration::from_secs(5 * 60);

/// Public route of the API, used to build proxied image URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoute {
    pub host: String,
    pub prefix: String,
    pub version: String,
}

impl ApiRoute {
    /// `http://{host}{prefix}{version}/analysis/image/{key}`
    pub fn image_proxy_url(&self, key: &ObjectKey) -> String {
        format!(
            "http://{}{}{}/analysis/image/{}",
            self.host, self.prefix, self.version, key
        )
    }
}

/// Turns stored image keys into URLs a client can fetch.
///
/// Prefers a presigned link from the storage backend and falls back to the
/// API's own image proxy route. Both resolve to the same bytes.
pub struct ImageUrlResolver {
    storage: Arc<dyn ObjectStoragePort>,
    route: ApiRoute,
}

impl ImageUrlResolver {
    pub fn new(storage: Arc<dyn ObjectStoragePort>, route: ApiRoute) -> Self {
        Self { storage, route }
    }

    pub async fn resolve(&self, key: &ObjectKey) -> String {
        match self.storage.presign(key, PRESIGN_TTL).await {
            Ok(Some(url)) => url,
            Ok(None) => self.route.image_proxy_url(key),
            Err(err) => {
                warn!(key = %key, error = %err, "presign failed, using proxied url");
                self.route.image_proxy_url(key)
            }
        }
    }
}
