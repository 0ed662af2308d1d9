use proptest::prelude::*;

use spv_primitives::chainhash::Hash;
use spv_verify::{
    compute_merkle_root, txid_from_raw_tx, verify_merkle_path, MerkleNode, Position,
};

fn node_strategy() -> impl Strategy<Value = MerkleNode> {
    (prop::array::uniform32(any::<u8>()), any::<bool>()).prop_map(|(bytes, left)| {
        if left {
            MerkleNode::left(Hash::new(bytes))
        } else {
            MerkleNode::right(Hash::new(bytes))
        }
    })
}

fn flip(node: &MerkleNode) -> MerkleNode {
    match node.position {
        Position::Left => MerkleNode::right(node.hash),
        Position::Right => MerkleNode::left(node.hash),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn txid_is_deterministic(raw in prop::collection::vec(any::<u8>(), 1..512)) {
        prop_assert_eq!(txid_from_raw_tx(&raw), txid_from_raw_tx(&raw));
    }

    #[test]
    fn computed_root_verifies(
        leaf in prop::array::uniform32(any::<u8>()),
        path in prop::collection::vec(node_strategy(), 0..12)
    ) {
        let leaf = Hash::new(leaf);
        let root = compute_merkle_root(&leaf, &path);
        prop_assert!(verify_merkle_path(&leaf, &path, &root));
    }

    #[test]
    fn flipping_a_distinct_sibling_breaks_the_path(
        leaf in prop::array::uniform32(any::<u8>()),
        path in prop::collection::vec(node_strategy(), 1..12),
        pick in any::<prop::sample::Index>()
    ) {
        let leaf = Hash::new(leaf);
        let root = compute_merkle_root(&leaf, &path);

        let i = pick.index(path.len());
        let acc = compute_merkle_root(&leaf, &path[..i]);
        // Swapping operands only matters when they differ.
        prop_assume!(acc != path[i].hash);

        let mut flipped = path.clone();
        flipped[i] = flip(&path[i]);
        prop_assert!(!verify_merkle_path(&leaf, &flipped, &root));
    }
}
