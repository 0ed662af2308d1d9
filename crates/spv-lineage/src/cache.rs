//! TTL cache of built bundles with live re-verification on read.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use spv_headers::HeaderStore;
use tracing::{debug, warn};

use crate::builder::{verify_bundle, LineageBundleBuilder};
use crate::clock::{Clock, SystemClock};
use crate::error::BuildReason;
use crate::store::LineageStore;
use crate::types::{Bundle, VersionId};

/// Default time a built bundle stays cached.
pub const DEFAULT_BUNDLE_TTL: Duration = Duration::from_secs(300);

/// Bundles are cached per target and traversal depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub version_id: VersionId,
    pub depth: u32,
}

impl CacheKey {
    pub fn new(version_id: VersionId, depth: u32) -> Self {
        Self { version_id, depth }
    }
}

struct CacheEntry {
    bundle: Bundle,
    stored_at: Duration,
}

/// Cache in front of a [`LineageBundleBuilder`].
///
/// Every read verifies the cached proofs again against the current header
/// snapshot and the current minimum-confirmation policy. A bundle that no
/// longer passes (a reorg dropped its block, or the policy was tightened)
/// is evicted and rebuilt. Confirmation counts in a returned bundle always
/// come from the snapshot taken for that read.
pub struct BundleCache<S> {
    builder: LineageBundleBuilder<S>,
    headers: Arc<HeaderStore>,
    min_confs: AtomicU32,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl<S: LineageStore> BundleCache<S> {
    pub fn new(builder: LineageBundleBuilder<S>, headers: Arc<HeaderStore>, min_confs: u32) -> Self {
        Self {
            builder,
            headers,
            min_confs: AtomicU32::new(min_confs),
            ttl: DEFAULT_BUNDLE_TTL,
            clock: Arc::new(SystemClock::new()),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.set_clock(clock);
        self
    }

    /// Replace the clock. Entries already stored keep their old timestamps.
    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn min_confs(&self) -> u32 {
        self.min_confs.load(Ordering::Relaxed)
    }

    /// Change the confirmation floor. Applies from the next read on,
    /// including reads of already-cached bundles.
    pub fn set_min_confs(&self, min_confs: u32) {
        self.min_confs.store(min_confs, Ordering::Relaxed);
    }

    pub fn builder(&self) -> &LineageBundleBuilder<S> {
        &self.builder
    }

    pub fn headers(&self) -> &Arc<HeaderStore> {
        &self.headers
    }

    /// Return the bundle for `version_id` at `depth`, building it on a miss.
    ///
    /// One header snapshot is used for the whole call.
    pub fn get(&self, version_id: &VersionId, depth: u32) -> Result<Bundle, BuildReason> {
        let key = CacheKey::new(*version_id, depth);
        let index = self.headers.snapshot();
        let min_confs = self.min_confs();

        if let Some(mut bundle) = self.lookup(&key) {
            match verify_bundle(&mut bundle, index.as_ref(), min_confs) {
                Ok(()) => {
                    debug!(version_id = %version_id, depth, "bundle.cache.hit");
                    return Ok(bundle);
                }
                Err(reason) => {
                    warn!(version_id = %version_id, depth, %reason, "bundle.cache.invalidated");
                    self.invalidate(&key);
                }
            }
        } else {
            debug!(version_id = %version_id, depth, "bundle.cache.miss");
        }

        let bundle = self.builder.build(version_id, depth, index.as_ref(), min_confs)?;
        self.set(key, bundle.clone());
        Ok(bundle)
    }

    /// Store `bundle` under `key`, replacing any previous entry.
    pub fn set(&self, key: CacheKey, bundle: Bundle) {
        let stored_at = self.clock.now();
        self.entries.lock().insert(key, CacheEntry { bundle, stored_at });
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Drop every cached depth of `version_id`.
    pub fn invalidate_version(&self, version_id: &VersionId) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| key.version_id != *version_id);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Remove expired entries. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !is_expired(entry, now, self.ttl));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Copy of the live entry for `key`; an expired entry is removed.
    fn lookup(&self, key: &CacheKey) -> Option<Bundle> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if is_expired(entry, now, self.ttl) {
            entries.remove(key);
            debug!(version_id = %key.version_id, depth = key.depth, "bundle.cache.expired");
            return None;
        }
        Some(entry.bundle.clone())
    }
}

fn is_expired(entry: &CacheEntry, now: Duration, ttl: Duration) -> bool {
    now.saturating_sub(entry.stored_at) >= ttl
}

impl<S> std::fmt::Debug for BundleCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleCache")
            .field("entries", &self.entries.lock().len())
            .field("ttl", &self.ttl)
            .field("min_confs", &self.min_confs.load(Ordering::Relaxed))
            .finish()
    }
}
