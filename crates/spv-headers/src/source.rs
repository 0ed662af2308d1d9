//! Header snapshot sources: a local file kept fresh by a mirror job, or
//! an HTTP mirror. Every fetch is bounded by a timeout.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Where a header snapshot is read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// A JSON file on local disk.
    File(PathBuf),
    /// A JSON document served over HTTP(S).
    Url(String),
}

impl std::fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotSource::File(path) => write!(f, "file:{}", path.display()),
            SnapshotSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Raw snapshot bytes plus the source modification time, when known.
#[derive(Clone, Debug)]
pub struct FetchedSnapshot {
    pub bytes: Vec<u8>,
    pub modified: Option<SystemTime>,
}

/// Reads a [`SnapshotSource`] with a per-fetch timeout.
#[derive(Clone, Debug)]
pub struct SnapshotFetcher {
    source: SnapshotSource,
    timeout: Duration,
    client: reqwest::Client,
}

impl SnapshotFetcher {
    /// Create a fetcher. The HTTP client is shared across fetches.
    pub fn new(source: SnapshotSource, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn source(&self) -> &SnapshotSource {
        &self.source
    }

    /// Read the snapshot once.
    ///
    /// # Errors
    /// [`LoadError::Timeout`] when the read exceeds the configured timeout,
    /// otherwise the underlying I/O or HTTP error.
    pub async fn fetch(&self) -> Result<FetchedSnapshot, LoadError> {
        match &self.source {
            SnapshotSource::File(path) => {
                let read = async {
                    let modified = tokio::fs::metadata(path).await?.modified().ok();
                    let bytes = tokio::fs::read(path).await?;
                    Ok::<_, std::io::Error>(FetchedSnapshot { bytes, modified })
                };
                tokio::time::timeout(self.timeout, read)
                    .await
                    .map_err(|_| LoadError::Timeout(self.timeout))?
                    .map_err(LoadError::from)
            }
            SnapshotSource::Url(url) => self.fetch_url(url).await,
        }
    }

    async fn fetch_url(&self, url: &str) -> Result<FetchedSnapshot, LoadError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus(status.as_u16()));
        }

        let bytes = resp.bytes().await.map_err(|e| self.map_http_error(e))?;
        Ok(FetchedSnapshot {
            bytes: bytes.to_vec(),
            modified: None,
        })
    }

    fn map_http_error(&self, e: reqwest::Error) -> LoadError {
        if e.is_timeout() {
            LoadError::Timeout(self.timeout)
        } else {
            LoadError::Http(e)
        }
    }
}
