//! Merkle inclusion verification.
//!
//! Hashes arrive in big-endian display form. `Hash` stores them in the
//! little-endian order used for hashing, so each step concatenates the
//! internal bytes directly and the final comparison is against the root's
//! internal bytes.

use serde::{Deserialize, Serialize};
use spv_primitives::chainhash::Hash;

use crate::merkle_tree_parent::merkle_tree_parent;

/// Which side of the running hash the sibling sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
}

/// One step of a Merkle path: a sibling hash and its side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleNode {
    pub hash: Hash,
    pub position: Position,
}

impl MerkleNode {
    pub fn left(hash: Hash) -> Self {
        MerkleNode { hash, position: Position::Left }
    }

    pub fn right(hash: Hash) -> Self {
        MerkleNode { hash, position: Position::Right }
    }
}

/// Fold `path` over `leaf` and return the resulting root.
///
/// A left sibling is hashed as `sibling || acc`, a right sibling as
/// `acc || sibling`. An empty path returns the leaf itself.
pub fn compute_merkle_root(leaf: &Hash, path: &[MerkleNode]) -> Hash {
    path.iter().fold(*leaf, |acc, node| match node.position {
        Position::Left => merkle_tree_parent(&node.hash, &acc),
        Position::Right => merkle_tree_parent(&acc, &node.hash),
    })
}

/// Check that `path` links `leaf` to `root`.
pub fn verify_merkle_path(leaf: &Hash, path: &[MerkleNode], root: &Hash) -> bool {
    compute_merkle_root(leaf, path) == *root
}

/// [`verify_merkle_path`] over display-order hex strings.
///
/// Malformed hex never verifies.
pub fn verify_merkle_path_hex(leaf_txid: &str, path: &[MerkleNode], root: &str) -> bool {
    match (Hash::from_hex(leaf_txid), Hash::from_hex(root)) {
        (Ok(leaf), Ok(root)) => verify_merkle_path(&leaf, path, &root),
        _ => false,
    }
}
