//! SPV header store.
//!
//! Loads a chain of block headers from a periodically refreshed snapshot
//! (a local file or an HTTP mirror), validates linkage and heights, and
//! exposes height/hash lookups and confirmation counts.
//!
//! A [`HeadersIndex`] is immutable once built. [`HeaderStore`] publishes a
//! new index by swapping an `Arc`, so readers always see either the old or
//! the new index in full.

pub mod error;
pub mod header;
pub mod index;
pub mod source;
pub mod store;


pub use error::{HeaderError, LoadError};
pub use header::{BlockHeader, CompactHeader, HEADER_SIZE};
pub use index::{HeaderRecord, HeadersIndex};
pub use source::{FetchedSnapshot, SnapshotFetcher, SnapshotSource};
pub use store::{HeaderStore, ReloadOutcome, MIN_RELOAD_INTERVAL};
