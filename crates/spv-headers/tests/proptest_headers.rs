use proptest::prelude::*;

use spv_headers::{CompactHeader, HeadersIndex, LoadError};
use spv_primitives::chainhash::Hash;

fn block_hash() -> Hash {
    Hash::new([0x42; 32])
}

/// A one-block `byHash` snapshot with the block at `height` and the tip at `best`.
fn single_block_index(height: u32, best: u32) -> HeadersIndex {
    let doc = serde_json::json!({
        "bestHeight": best,
        "tipHash": block_hash().to_string(),
        "byHash": {
            block_hash().to_string(): {
                "prevHash": "00".repeat(32),
                "merkleRoot": "11".repeat(32),
                "height": height,
            }
        }
    });
    HeadersIndex::from_snapshot_bytes(doc.to_string().as_bytes()).unwrap()
}

fn chain(len: usize) -> Vec<CompactHeader> {
    (0..len)
        .map(|i| {
            let mut hash = [0u8; 32];
            hash[..8].copy_from_slice(&(i as u64 + 1).to_le_bytes());
            let mut prev = [0u8; 32];
            prev[..8].copy_from_slice(&(i as u64).to_le_bytes());
            CompactHeader {
                raw: None,
                hash: Hash::new(hash),
                prev_hash: Hash::new(prev),
                merkle_root: Hash::default(),
                height: 1000 + i as u32,
                time: None,
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn confirmations_increase_with_best_height(height in 0u32..1_000_000, best in 0u32..1_000_000) {
        let idx = single_block_index(height, best);
        let next = single_block_index(height, best + 1);
        let confs = idx.get_confirmations(&block_hash());
        let next_confs = next.get_confirmations(&block_hash());

        if best >= height {
            prop_assert_eq!(confs, best - height + 1);
            prop_assert!(next_confs > confs);
        } else {
            prop_assert_eq!(confs, 0);
        }
    }

    #[test]
    fn unknown_hash_has_no_confirmations(best in any::<u32>()) {
        let idx = single_block_index(0, best);
        prop_assert_eq!(idx.get_confirmations(&Hash::new([0x99; 32])), 0);
    }

    #[test]
    fn any_broken_link_rejects_whole_chain(len in 2usize..40, at in any::<prop::sample::Index>()) {
        let mut headers = chain(len);
        let broken = 1 + at.index(len - 1);
        headers[broken].prev_hash = Hash::new([0xff; 32]);

        let is_chain_break = matches!(
            HeadersIndex::from_chain(&headers),
            Err(LoadError::ChainBreak { index, .. }) if index == broken
        );
        prop_assert!(is_chain_break);
    }

    #[test]
    fn valid_chain_tip_is_last_header(len in 1usize..40) {
        let headers = chain(len);
        let idx = HeadersIndex::from_chain(&headers).unwrap();
        prop_assert_eq!(idx.best_height(), 1000 + len as u32 - 1);
        prop_assert_eq!(idx.tip_hash(), headers[len - 1].hash);
        prop_assert_eq!(idx.get_confirmations(&headers[0].hash), len as u32);
    }
}
