use proptest::prelude::*;

use spv_primitives::chainhash::{double_hash_h, Hash};
use spv_primitives::hash::sha256d;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hash_display_is_reversed_internal_bytes(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        let mut reversed = bytes;
        reversed.reverse();
        prop_assert_eq!(hash.to_string(), hex::encode(reversed));
        prop_assert_eq!(Hash::from_hex(&hash.to_string()).unwrap(), hash);
    }

    #[test]
    fn double_hash_h_is_stable(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let a = double_hash_h(&data);
        let b = double_hash_h(&data);
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.as_bytes(), &sha256d(&data));
    }
}
