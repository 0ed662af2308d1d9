//! Dataset lineage bundles.
//!
//! [`LineageBundleBuilder`] walks a version's ancestors in a
//! [`LineageStore`], collects their manifests and inclusion proofs and
//! verifies every proof against a header snapshot. [`BundleCache`] keeps
//! built bundles for a TTL and re-verifies them on every read, so a cached
//! bundle whose proofs stopped satisfying policy is rebuilt instead of
//! served.

pub mod builder;
pub mod cache;
pub mod clock;
pub mod error;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use builder::{verify_bundle, LineageBundleBuilder, DEFAULT_MAX_DEPTH};
pub use cache::{BundleCache, CacheKey, DEFAULT_BUNDLE_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BuildReason, StoreError};
pub use store::{Declaration, LineageStore, ManifestRecord, MemoryLineageStore};
pub use types::{
    Bundle, LineageEdge, LineageGraph, LineageNode, ManifestEntry, ProofEntry, VersionId,
    BUNDLE_TYPE,
};
