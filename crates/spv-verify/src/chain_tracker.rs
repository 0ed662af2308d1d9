//! Chain tracker trait for SPV verification.

use spv_headers::{HeaderRecord, HeadersIndex};
use spv_primitives::chainhash::Hash;

/// Read access to block headers, as needed by the envelope verifier.
///
/// [`HeadersIndex`] is the production implementation; verification is
/// generic over this trait so callers can supply any header view.
pub trait ChainTracker {
    /// Look up a header by block hash.
    fn header(&self, hash: &Hash) -> Option<&HeaderRecord>;

    /// Confirmations of a block; 0 when the hash is unknown.
    fn confirmations(&self, hash: &Hash) -> u32;

    /// Get the current chain tip height.
    fn current_height(&self) -> u32;

    /// Verify that a Merkle root is the root of the block at `height`.
    fn is_valid_root_for_height(&self, root: &Hash, height: u32) -> bool;
}

impl ChainTracker for HeadersIndex {
    fn header(&self, hash: &Hash) -> Option<&HeaderRecord> {
        self.get_header(hash)
    }

    fn confirmations(&self, hash: &Hash) -> u32 {
        self.get_confirmations(hash)
    }

    fn current_height(&self) -> u32 {
        self.best_height()
    }

    fn is_valid_root_for_height(&self, root: &Hash, height: u32) -> bool {
        self.header_by_height(height)
            .and_then(|record| record.merkle_root)
            .is_some_and(|indexed| indexed == *root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spv_headers::CompactHeader;

    #[test]
    fn test_headers_index_tracker() {
        let headers: Vec<CompactHeader> = (0u8..3)
            .map(|i| CompactHeader {
                raw: None,
                hash: Hash::new([i + 1; 32]),
                prev_hash: Hash::new([i; 32]),
                merkle_root: Hash::new([0xa0 + i; 32]),
                height: 500 + i as u32,
                time: None,
            })
            .collect();
        let idx = HeadersIndex::from_chain(&headers).unwrap();

        assert_eq!(idx.current_height(), 502);
        assert_eq!(ChainTracker::confirmations(&idx, &Hash::new([1; 32])), 3);
        assert!(idx.is_valid_root_for_height(&Hash::new([0xa1; 32]), 501));
        assert!(!idx.is_valid_root_for_height(&Hash::new([0xa1; 32]), 500));
        assert!(!idx.is_valid_root_for_height(&Hash::new([0xa1; 32]), 999));
        assert_eq!(ChainTracker::header(&idx, &Hash::new([2; 32])).unwrap().height, 501);
    }
}
