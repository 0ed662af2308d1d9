//! Envelope verification failure reasons.

use spv_primitives::chainhash::Hash;

/// Why an envelope failed verification.
///
/// `Display` renders the stable reason code (`insufficient-confs`, ...);
/// the variant fields carry the context a caller needs to choose between
/// retrying later and rejecting for good.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VerifyReason {
    #[error("txid-mismatch-top-level-vs-proof")]
    TxidMismatchTopLevelVsProof { top_level: Hash, proof: Hash },

    #[error("txid-mismatch-rawtx-vs-proof")]
    TxidMismatchRawTxVsProof { derived: Hash, proof: Hash },

    #[error("invalid-block-header")]
    InvalidBlockHeader(String),

    #[error("unknown-block-hash")]
    UnknownBlockHash(Hash),

    #[error("block-height-mismatch")]
    BlockHeightMismatch { claimed: u32, indexed: u32 },

    /// The indexed header for this block has no Merkle root.
    #[error("merkle-root-unavailable")]
    MerkleRootUnavailable(Hash),

    #[error("invalid-merkle-path")]
    InvalidMerklePath { expected_root: Hash, computed_root: Hash },

    #[error("insufficient-confs")]
    InsufficientConfs { block_hash: Hash, confirmations: u32, required: u32 },
}

impl VerifyReason {
    /// Stable reason code, identical to `to_string()`.
    pub fn code(&self) -> &'static str {
        match self {
            VerifyReason::TxidMismatchTopLevelVsProof { .. } => "txid-mismatch-top-level-vs-proof",
            VerifyReason::TxidMismatchRawTxVsProof { .. } => "txid-mismatch-rawtx-vs-proof",
            VerifyReason::InvalidBlockHeader(_) => "invalid-block-header",
            VerifyReason::UnknownBlockHash(_) => "unknown-block-hash",
            VerifyReason::BlockHeightMismatch { .. } => "block-height-mismatch",
            VerifyReason::MerkleRootUnavailable(_) => "merkle-root-unavailable",
            VerifyReason::InvalidMerklePath { .. } => "invalid-merkle-path",
            VerifyReason::InsufficientConfs { .. } => "insufficient-confs",
        }
    }

    /// Confirmations computed before the failure, if the check got that far.
    pub fn confirmations(&self) -> Option<u32> {
        match self {
            VerifyReason::InsufficientConfs { confirmations, .. } => Some(*confirmations),
            _ => None,
        }
    }

    /// Whether more blocks on top of the same chain could make this envelope pass.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VerifyReason::InsufficientConfs { .. } | VerifyReason::UnknownBlockHash(_)
        )
    }
}
