//! Error types for header parsing and snapshot loading.

use std::time::Duration;

use spv_primitives::chainhash::Hash;

/// Errors from parsing a single 80-byte block header.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("header is not valid hex: {0}")]
    InvalidHex(String),

    #[error("header must be 80 bytes, got {0}")]
    InvalidLength(usize),
}

/// Errors from loading a header snapshot.
///
/// A cold load that fails with any of these leaves the store without an
/// index. During hot reload they are logged and the last good index
/// stays active.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The snapshot is not JSON.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is neither a header array, a `headers` document nor a `byHash` document.
    #[error("unrecognised snapshot shape: {0}")]
    UnknownShape(String),

    #[error("empty headers")]
    Empty,

    #[error("invalid header at {index}: {reason}")]
    InvalidHeader { index: usize, reason: String },

    /// `headers[index].prevHash` does not link to `headers[index - 1].hash`.
    #[error("chain break at {index}: {prev_hash} != {expected}")]
    ChainBreak { index: usize, prev_hash: Hash, expected: Hash },

    #[error("bad height at {index}: {height} vs {prev_height}")]
    BadHeight { index: usize, height: u32, prev_height: u32 },

    /// A declared field disagrees with the value derived from the raw header.
    #[error("header mismatch at {index}: {field} does not match raw header")]
    HeaderMismatch { index: usize, field: &'static str },

    #[error("tip mismatch: {0}")]
    TipMismatch(String),

    #[error("duplicate height {0} in snapshot")]
    DuplicateHeight(u32),

    #[error("invalid byHash key {key}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mirror returned status {0}")]
    HttpStatus(u16),

    #[error("snapshot fetch timed out after {0:?}")]
    Timeout(Duration),
}
