//! Merkle tree parent computation.

use spv_primitives::chainhash::Hash;
use spv_primitives::hash::sha256d;

/// Compute the Merkle tree parent of two display-order hex hashes.
///
/// Each hex string is reversed into internal order, the two are
/// concatenated and double-SHA256'd, and the result is returned in
/// display order again.
pub fn merkle_tree_parent_str(left: &str, right: &str) -> Result<String, spv_primitives::PrimitivesError> {
    let l = Hash::from_hex(left)?;
    let r = Hash::from_hex(right)?;
    Ok(merkle_tree_parent(&l, &r).to_string())
}

/// Compute the Merkle tree parent of two `Hash` values.
///
/// The hashes are in internal (little-endian) byte order. They are
/// concatenated directly (no reversal) and double-SHA256'd.
pub fn merkle_tree_parent(left: &Hash, right: &Hash) -> Hash {
    let mut concatenated = [0u8; 64];
    concatenated[..32].copy_from_slice(left.as_bytes());
    concatenated[32..].copy_from_slice(right.as_bytes());
    Hash::new(sha256d(&concatenated))
}
