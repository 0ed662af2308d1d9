//! Provenance service: the operations the HTTP and CLI layers call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spv_headers::{HeaderRecord, HeaderStore, SnapshotFetcher};
use spv_lineage::{
    Bundle, BuildReason, BundleCache, Clock, LineageBundleBuilder, LineageStore, VersionId,
};
use spv_primitives::chainhash::Hash;
use spv_verify::{SpvEnvelope, VerificationResult};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{BundlesConfig, OverlayConfig};
use crate::error::ServiceError;

/// Per-request readiness requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPolicy {
    /// Minimum confirmations the weakest proof must have. Checked on top of
    /// the service-wide floor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confs: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,

    /// Attach the bundle to the report.
    #[serde(default)]
    pub include_bundle: bool,
}

/// Whether a version's lineage is provably anchored right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyReport {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confs_used: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<Bundle>,
}

/// Header store, bundle cache and policy behind one handle.
pub struct ProvenanceService<S> {
    headers: Arc<HeaderStore>,
    cache: BundleCache<S>,
    bundles: BundlesConfig,
    reload_task: Option<JoinHandle<()>>,
}

impl<S: LineageStore> ProvenanceService<S> {
    /// Assemble a service around an already-loaded header store.
    ///
    /// No hot-reload task is started.
    pub fn new(headers: Arc<HeaderStore>, store: S, config: &OverlayConfig) -> Self {
        let cache = BundleCache::new(
            LineageBundleBuilder::new(store),
            headers.clone(),
            config.policy.min_confs,
        )
        .with_ttl(config.bundles.ttl());
        Self {
            headers,
            cache,
            bundles: config.bundles.clone(),
            reload_task: None,
        }
    }

    /// Cold-load the configured header snapshot and start hot reload.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the first snapshot cannot be
    /// fetched and validated. The service is never started without headers.
    pub async fn start(config: &OverlayConfig, store: S) -> Result<Self, ServiceError> {
        config.validate()?;
        let fetcher =
            SnapshotFetcher::new(config.headers.source.clone(), config.headers.fetch_timeout());
        let headers = Arc::new(HeaderStore::open(fetcher).await?);

        let reload_task = headers.spawn_hot_reload(config.headers.reload_interval());
        let mut service = Self::new(headers, store, config);
        service.reload_task = Some(reload_task);
        Ok(service)
    }

    /// Replace the cache clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache.set_clock(clock);
        self
    }

    pub fn headers(&self) -> &Arc<HeaderStore> {
        &self.headers
    }

    pub fn cache(&self) -> &BundleCache<S> {
        &self.cache
    }

    /// Verify a single envelope against the current snapshot.
    pub fn verify_envelope(&self, envelope: &SpvEnvelope, min_confs: u32) -> VerificationResult {
        let index = self.headers.snapshot();
        spv_verify::verify_envelope(envelope, index.as_ref(), min_confs).into()
    }

    /// The lineage bundle of `version_id`, from cache when still valid.
    ///
    /// `depth` defaults to the configured default and is clamped to the
    /// configured maximum. Expired entries for other keys are dropped first.
    pub fn build_or_get_bundle(
        &self,
        version_id: &VersionId,
        depth: Option<u32>,
    ) -> Result<Bundle, BuildReason> {
        let purged = self.cache.purge_expired();
        if purged > 0 {
            debug!(purged, "bundle.cache.purged");
        }
        self.cache.get(version_id, self.bundles.effective_depth(depth))
    }

    pub fn get_confirmations(&self, block_hash: &Hash) -> u32 {
        self.headers.get_confirmations(block_hash)
    }

    pub fn get_best_height(&self) -> u32 {
        self.headers.best_height()
    }

    pub fn get_header(&self, block_hash: &Hash) -> Option<HeaderRecord> {
        self.headers.get_header(block_hash)
    }

    /// Change the service-wide confirmation floor.
    pub fn set_min_confs(&self, min_confs: u32) {
        self.cache.set_min_confs(min_confs);
    }

    /// Readiness of `version_id` under `policy`. Failures become reasons.
    pub fn ready(&self, version_id: &VersionId, policy: &ReadyPolicy) -> ReadyReport {
        match self.build_or_get_bundle(version_id, policy.depth) {
            Ok(bundle) => {
                let mut reasons = Vec::new();
                if let Some(required) = policy.min_confs {
                    if bundle.confs_used.unwrap_or(0) < required {
                        reasons.push("insufficient-confs".to_string());
                    }
                }
                ReadyReport {
                    ready: reasons.is_empty(),
                    reasons,
                    confs_used: bundle.confs_used,
                    best_height: bundle.best_height,
                    bundle: policy.include_bundle.then_some(bundle),
                }
            }
            Err(reason) => {
                let confs_used = match &reason {
                    BuildReason::InvalidEnvelope { reason, .. } => reason.confirmations(),
                    _ => None,
                };
                ReadyReport {
                    ready: false,
                    reasons: vec![reason.to_string()],
                    confs_used,
                    best_height: Some(self.get_best_height()),
                    bundle: None,
                }
            }
        }
    }
}

impl<S> Drop for ProvenanceService<S> {
    fn drop(&mut self) {
        if let Some(task) = self.reload_task.take() {
            task.abort();
        }
    }
}

impl<S> std::fmt::Debug for ProvenanceService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvenanceService")
            .field("headers", &self.headers)
            .field("cache", &self.cache)
            .field("bundles", &self.bundles)
            .field("hot_reload", &self.reload_task.is_some())
            .finish()
    }
}
