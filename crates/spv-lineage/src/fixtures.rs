//! Lineage graphs with confirmed proofs for unit tests.

use std::sync::Arc;

use serde_json::json;
use spv_headers::{CompactHeader, HeadersIndex};
use spv_primitives::chainhash::Hash;
use spv_verify::{txid_from_raw_tx, BlockRef, MerkleProof, SpvEnvelope};

use crate::store::{Declaration, ManifestRecord, MemoryLineageStore};
use crate::types::VersionId;

pub(crate) const FIRST_HEIGHT: u32 = 100;

pub(crate) fn vid(n: u8) -> VersionId {
    VersionId::from_bytes([n; 32])
}

/// Builds a store and a header chain side by side. Each published version
/// is declared in its own block, mined in publication order.
#[derive(Default)]
pub(crate) struct Fixture {
    pub store: Arc<MemoryLineageStore>,
    chain: Vec<CompactHeader>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish version `n` with the given parents and a single-leaf proof.
    pub fn publish(&mut self, n: u8, parents: &[u8]) -> VersionId {
        let id = vid(n);
        self.store.insert_manifest(
            id,
            ManifestRecord {
                manifest_hash: format!("manifest-{n}"),
                content_hash: format!("content-{n}"),
                manifest_json: json!({ "name": format!("dataset v{n}") }).to_string(),
            },
        );
        self.declare(n);
        self.store.set_parents(id, parents.iter().map(|p| vid(*p)).collect());
        id
    }

    /// Mine a fresh declaration of version `n` in a new block and replace
    /// the stored one. Returns the new block height.
    pub fn declare(&mut self, n: u8) -> u32 {
        let raw_tx = vec![0xd0, n];
        let txid = txid_from_raw_tx(&raw_tx);
        let height = self.push_block(txid);

        let envelope = SpvEnvelope {
            raw_tx: raw_tx.clone(),
            txid: Some(txid),
            proof: MerkleProof { txid, merkle_root: txid, path: vec![] },
            block: BlockRef::HashHeight {
                block_hash: self.block_hash(height),
                block_height: Some(height),
            },
            header_chain: None,
            confirmations: Some(9999),
            ts: None,
        };
        self.store.insert_declaration(
            vid(n),
            Declaration {
                txid,
                raw_tx,
                proof_json: Some(serde_json::to_string(&envelope).unwrap()),
                opret_vout: 1,
            },
        );
        height
    }

    /// Publish a straight chain `n, n-1, ..., 0` where each version's parent is
    /// the next lower id; returns the newest (`n`).
    pub fn publish_chain(&mut self, n: u8) -> VersionId {
        self.publish(0, &[]);
        for i in 1..=n {
            self.publish(i, &[i - 1]);
        }
        vid(n)
    }

    /// Extend the chain with `count` empty blocks.
    pub fn mine(&mut self, count: u32) {
        for _ in 0..count {
            self.push_block(Hash::default());
        }
    }

    pub fn index(&self) -> HeadersIndex {
        HeadersIndex::from_chain(&self.chain).unwrap()
    }

    /// Index of the first `len` blocks only, as after a reorg that dropped the rest.
    pub fn truncated_index(&self, len: usize) -> HeadersIndex {
        HeadersIndex::from_chain(&self.chain[..len]).unwrap()
    }

    /// Index without the first `skip` blocks.
    pub fn index_from(&self, skip: usize) -> HeadersIndex {
        HeadersIndex::from_chain(&self.chain[skip..]).unwrap()
    }

    fn block_hash(&self, height: u32) -> Hash {
        let mut bytes = [0xb1; 32];
        bytes[..4].copy_from_slice(&height.to_le_bytes());
        Hash::new(bytes)
    }

    fn push_block(&mut self, merkle_root: Hash) -> u32 {
        let height = FIRST_HEIGHT + self.chain.len() as u32;
        let prev_hash = self.chain.last().map(|h| h.hash).unwrap_or_default();
        self.chain.push(CompactHeader {
            raw: None,
            hash: self.block_hash(height),
            prev_hash,
            merkle_root,
            height,
            time: None,
        });
        height
    }
}
