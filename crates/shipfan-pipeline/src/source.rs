//! Object sources: where the fulfillment document is fetched from.
//!
//! An object is named by `(bucket, key)`. The key doubles as the source file
//! name carried in every dispatched message.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::SourceError;

/// Fetches the text body of a stored object.
#[async_trait]
pub trait ObjectSource: Send + Sync + 'static {
    /// Returns the object's body. A missing object and an empty body are
    /// reported as distinct errors.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<String, SourceError>;

    fn name(&self) -> &str;
}

fn non_empty(body: String, bucket: &str, key: &str) -> Result<String, SourceError> {
    if body.trim().is_empty() {
        return Err(SourceError::EmptyBody {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
    }
    Ok(body)
}

// ─── Filesystem ───────────────────────────────────────────────────────────────

/// Reads `<root>/<bucket>/<key>` from local disk.
#[derive(Debug, Clone)]
pub struct FsObjectSource {
    root: PathBuf,
}

impl FsObjectSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, SourceError> {
        for part in [bucket, key] {
            let escapes = Path::new(part)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if part.is_empty() || escapes {
                return Err(SourceError::InvalidKey {
                    key: part.to_string(),
                    reason: "must be a relative path without '..'".into(),
                });
            }
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectSource for FsObjectSource {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<String, SourceError> {
        let path = self.object_path(bucket, key)?;
        debug!(path = %path.display(), "reading object");
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        non_empty(body, bucket, key)
    }

    fn name(&self) -> &str {
        "fs"
    }
}

// ─── HTTP ─────────────────────────────────────────────────────────────────────

/// Path-style `GET {endpoint}/{bucket}/{key}` against an object store.
#[derive(Clone)]
pub struct HttpObjectSource {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpObjectSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let endpoint = endpoint.into();
        let invalid = |reason: String| SourceError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason,
        };
        let parsed = Url::parse(&endpoint).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("not a base URL".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: parsed,
        })
    }

    /// Object URL with the bucket and each `/`-separated key segment
    /// percent-encoded.
    pub fn object_url(&self, bucket: &str, key: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(bucket)
                .extend(key.trim_start_matches('/').split('/'));
        }
        url
    }
}

#[async_trait]
impl ObjectSource for HttpObjectSource {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<String, SourceError> {
        let url = self.object_url(bucket, key);
        debug!(url = %url, "fetching object");

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;
        non_empty(body, bucket, key)
    }

    fn name(&self) -> &str {
        self.endpoint.as_str()
    }
}
