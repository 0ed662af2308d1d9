//! Header store with atomic snapshot replacement and hot reload.

use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use parking_lot::{Mutex, RwLock};
use spv_primitives::chainhash::Hash;
use spv_primitives::hash::sha256;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Shortest period accepted by [`HeaderStore::spawn_hot_reload`].
pub const MIN_RELOAD_INTERVAL: Duration = Duration::from_millis(10);

use crate::error::LoadError;
use crate::index::{HeaderRecord, HeadersIndex};
use crate::source::SnapshotFetcher;

/// Result of a single refresh attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The source content is identical to the last loaded snapshot.
    Unchanged,
    /// A new index was validated and published.
    Reloaded { best_height: u32, tip_hash: Hash },
}

/// Identity of the last snapshot that was successfully published.
#[derive(Clone, Debug)]
struct SnapshotStamp {
    digest: [u8; 32],
    modified: Option<SystemTime>,
}

/// Owner of the active [`HeadersIndex`].
///
/// Readers take an `Arc` to the current index with [`snapshot`](Self::snapshot)
/// and keep using it for the rest of their request, even if a reload
/// publishes a newer one in the meantime.
pub struct HeaderStore {
    current: RwLock<Arc<HeadersIndex>>,
    fetcher: Option<SnapshotFetcher>,
    last_seen: Mutex<Option<SnapshotStamp>>,
    /// Held across fetch, compare and publish.
    refresh_lock: tokio::sync::Mutex<()>,
}

impl HeaderStore {
    /// Wrap an already-built index. Such a store has no source to reload from.
    pub fn from_index(index: HeadersIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
            fetcher: None,
            last_seen: Mutex::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Cold-load the store from `fetcher`.
    ///
    /// Any fetch, parse or validation failure is returned to the caller;
    /// there is no previous index to fall back to.
    pub async fn open(fetcher: SnapshotFetcher) -> Result<Self, LoadError> {
        let fetched = fetcher.fetch().await?;
        let index = HeadersIndex::from_snapshot_bytes(&fetched.bytes)?;
        info!(
            source = %fetcher.source(),
            best_height = index.best_height(),
            tip = %index.tip_hash(),
            "headers.loaded"
        );
        Ok(Self {
            current: RwLock::new(Arc::new(index)),
            last_seen: Mutex::new(Some(SnapshotStamp {
                digest: sha256(&fetched.bytes),
                modified: fetched.modified,
            })),
            fetcher: Some(fetcher),
            refresh_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// The active index. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<HeadersIndex> {
        self.current.read().clone()
    }

    pub fn best_height(&self) -> u32 {
        self.snapshot().best_height()
    }

    pub fn tip_hash(&self) -> Hash {
        self.snapshot().tip_hash()
    }

    pub fn get_header(&self, hash: &Hash) -> Option<HeaderRecord> {
        self.snapshot().get_header(hash).cloned()
    }

    /// Confirmations of `hash` against the active index; 0 if unknown.
    pub fn get_confirmations(&self, hash: &Hash) -> u32 {
        self.snapshot().get_confirmations(hash)
    }

    /// Replace the active index.
    pub fn publish(&self, index: HeadersIndex) -> Arc<HeadersIndex> {
        let index = Arc::new(index);
        *self.current.write() = index.clone();
        index
    }

    /// Parse `bytes` and publish the result.
    ///
    /// On error the active index is left untouched.
    pub fn replace_from_bytes(&self, bytes: &[u8]) -> Result<Arc<HeadersIndex>, LoadError> {
        let index = HeadersIndex::from_snapshot_bytes(bytes)?;
        Ok(self.publish(index))
    }

    /// Re-read the source and publish a new index if its content changed.
    ///
    /// Stores without a source always report [`ReloadOutcome::Unchanged`].
    /// Concurrent calls run one at a time, so a slower fetch never publishes
    /// over a newer one.
    pub async fn refresh(&self) -> Result<ReloadOutcome, LoadError> {
        let Some(fetcher) = &self.fetcher else {
            return Ok(ReloadOutcome::Unchanged);
        };
        let _guard = self.refresh_lock.lock().await;

        let fetched = fetcher.fetch().await?;
        let digest = sha256(&fetched.bytes);
        {
            let mut last = self.last_seen.lock();
            if let Some(stamp) = last.as_mut() {
                if stamp.digest == digest {
                    stamp.modified = fetched.modified;
                    return Ok(ReloadOutcome::Unchanged);
                }
            }
        }

        let index = self.replace_from_bytes(&fetched.bytes)?;
        *self.last_seen.lock() = Some(SnapshotStamp {
            digest,
            modified: fetched.modified,
        });
        Ok(ReloadOutcome::Reloaded {
            best_height: index.best_height(),
            tip_hash: index.tip_hash(),
        })
    }

    /// Modification time of the last published snapshot, when the source reports one.
    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_seen.lock().as_ref().and_then(|s| s.modified)
    }

    /// Spawn a task that calls [`refresh`](Self::refresh) every `interval`.
    ///
    /// Failures are logged and the last good index keeps serving. The task
    /// ends once the store is dropped; abort the handle to stop it sooner.
    /// Periods below [`MIN_RELOAD_INTERVAL`] are raised to it.
    pub fn spawn_hot_reload(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let interval = interval.max(MIN_RELOAD_INTERVAL);
        let store: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    debug!("headers.reload.stopped");
                    return;
                };
                match store.refresh().await {
                    Ok(ReloadOutcome::Reloaded { best_height, tip_hash }) => {
                        info!(best_height, tip = %tip_hash, "headers.reloaded");
                    }
                    Ok(ReloadOutcome::Unchanged) => debug!("headers.unchanged"),
                    Err(e) => warn!(error = %e, "headers.reload.error"),
                }
            }
        })
    }
}

impl std::fmt::Debug for HeaderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let index = self.snapshot();
        f.debug_struct("HeaderStore")
            .field("best_height", &index.best_height())
            .field("tip_hash", &index.tip_hash())
            .field("source", &self.fetcher.as_ref().map(|f| f.source().clone()))
            .finish()
    }
}
