//! SPV verification.
//!
//! Provides the Merkle inclusion verifier, the SPV envelope types and the
//! envelope verifier that ties a raw transaction to a block in a
//! [`HeadersIndex`](spv_headers::HeadersIndex) and computes its
//! confirmation depth.

pub mod error;
pub mod merkle_tree_parent;
pub mod merkle;
pub mod chain_tracker;
pub mod envelope;

pub use error::VerifyReason;
pub use merkle::{compute_merkle_root, verify_merkle_path, verify_merkle_path_hex, MerkleNode, Position};
pub use merkle_tree_parent::{merkle_tree_parent, merkle_tree_parent_str};
pub use chain_tracker::ChainTracker;
pub use envelope::{
    txid_from_raw_tx, verify_envelope, BlockRef, MerkleProof, SpvEnvelope, Verification,
    VerificationResult,
};
