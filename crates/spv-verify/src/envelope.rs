//! SPV envelopes and their end-to-end verification.
//!
//! An envelope packages a raw transaction, its Merkle inclusion proof and
//! a reference to the block it was mined in. Verification proceeds in a
//! fixed order and stops at the first failing step:
//!
//! 1. txid consistency (top-level, proof, and derived from `rawTx`)
//! 2. block resolution (raw header, or hash/height looked up in the index)
//! 3. Merkle path against the resolved root
//! 4. confirmations against the minimum policy

use serde::{Deserialize, Serialize};
use spv_headers::BlockHeader;
use spv_primitives::chainhash::{double_hash_h, Hash};

use crate::chain_tracker::ChainTracker;
use crate::error::VerifyReason;
use crate::merkle::{compute_merkle_root, MerkleNode};

/// Claimed inclusion proof for a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    pub txid: Hash,
    pub merkle_root: Hash,
    pub path: Vec<MerkleNode>,
}

/// The block an envelope claims inclusion in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockRef {
    /// Self-contained: root and block hash derive from the 80-byte header.
    Header {
        #[serde(rename = "blockHeader")]
        block_header: String,
    },
    /// Root and height come from the header index.
    HashHeight {
        #[serde(rename = "blockHash")]
        block_hash: Hash,
        #[serde(rename = "blockHeight", default, skip_serializing_if = "Option::is_none")]
        block_height: Option<u32>,
    },
}

/// A raw transaction, its inclusion proof and a block reference.
///
/// `confirmations` is derived data: verification recomputes it and callers
/// must never trust a stored value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpvEnvelope {
    #[serde(with = "raw_tx_hex")]
    pub raw_tx: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<Hash>,
    pub proof: MerkleProof,
    pub block: BlockRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_chain: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<u64>,
}

impl SpvEnvelope {
    /// Parse an envelope from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A successful verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verification {
    pub confirmations: u32,
    pub block_hash: Hash,
    /// Height from the index, when the block is indexed.
    pub block_height: Option<u32>,
}

/// Serializable outcome for the HTTP/CLI boundary. Never an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub ok: bool,
    pub confirmations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Result<Verification, VerifyReason>> for VerificationResult {
    fn from(result: Result<Verification, VerifyReason>) -> Self {
        match result {
            Ok(v) => VerificationResult {
                ok: true,
                confirmations: v.confirmations,
                block_hash: Some(v.block_hash),
                block_height: v.block_height,
                reason: None,
            },
            Err(reason) => VerificationResult {
                ok: false,
                confirmations: reason.confirmations().unwrap_or(0),
                block_hash: match &reason {
                    VerifyReason::InsufficientConfs { block_hash, .. } => Some(*block_hash),
                    _ => None,
                },
                block_height: None,
                reason: Some(reason.to_string()),
            },
        }
    }
}

/// Derive a txid: double SHA-256 of the raw transaction, displayed byte-reversed.
pub fn txid_from_raw_tx(raw_tx: &[u8]) -> Hash {
    double_hash_h(raw_tx)
}

/// Verify `env` against `chain` and require at least `min_confs` confirmations.
///
/// # Errors
/// The first failing step's [`VerifyReason`]. `InsufficientConfs` still
/// carries the computed confirmation count.
pub fn verify_envelope<C: ChainTracker + ?Sized>(
    env: &SpvEnvelope,
    chain: &C,
    min_confs: u32,
) -> Result<Verification, VerifyReason> {
    if let Some(top_level) = env.txid {
        if top_level != env.proof.txid {
            return Err(VerifyReason::TxidMismatchTopLevelVsProof {
                top_level,
                proof: env.proof.txid,
            });
        }
    }
    let derived = txid_from_raw_tx(&env.raw_tx);
    if derived != env.proof.txid {
        return Err(VerifyReason::TxidMismatchRawTxVsProof {
            derived,
            proof: env.proof.txid,
        });
    }

    let (root, block_hash) = resolve_block(&env.block, chain)?;

    let computed_root = compute_merkle_root(&derived, &env.proof.path);
    if env.proof.merkle_root != root || computed_root != root {
        return Err(VerifyReason::InvalidMerklePath { expected_root: root, computed_root });
    }

    let confirmations = chain.confirmations(&block_hash);
    if confirmations < min_confs {
        return Err(VerifyReason::InsufficientConfs {
            block_hash,
            confirmations,
            required: min_confs,
        });
    }

    Ok(Verification {
        confirmations,
        block_hash,
        block_height: chain.header(&block_hash).map(|r| r.height),
    })
}

/// Resolve the Merkle root and block hash an envelope points at.
fn resolve_block<C: ChainTracker + ?Sized>(
    block: &BlockRef,
    chain: &C,
) -> Result<(Hash, Hash), VerifyReason> {
    match block {
        BlockRef::Header { block_header } => {
            let header = BlockHeader::from_hex(block_header)
                .map_err(|e| VerifyReason::InvalidBlockHeader(e.to_string()))?;
            Ok((header.merkle_root, header.block_hash()))
        }
        BlockRef::HashHeight { block_hash, block_height } => {
            let record = chain
                .header(block_hash)
                .ok_or(VerifyReason::UnknownBlockHash(*block_hash))?;
            if let Some(claimed) = block_height {
                if *claimed != record.height {
                    return Err(VerifyReason::BlockHeightMismatch {
                        claimed: *claimed,
                        indexed: record.height,
                    });
                }
            }
            let root = record
                .merkle_root
                .ok_or(VerifyReason::MerkleRootUnavailable(*block_hash))?;
            Ok((root, *block_hash))
        }
    }
}

mod raw_tx_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(serde::de::Error::custom("rawTx is empty"));
        }
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
