/// SPV primitives - hashing, chain hashes and binary layout helpers.
///
/// This crate provides the building blocks shared by the header store,
/// the Merkle/envelope verifier and the lineage bundle cache:
/// - Hash functions (SHA-256, SHA-256d)
/// - Chain hash type for transaction and block identification
/// - Little-endian cursor reader/writer for fixed binary layouts

pub mod hash;
pub mod chainhash;
pub mod util;

mod error;
pub use error::PrimitivesError;
