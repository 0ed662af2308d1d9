//! 80-byte block header parsing and the compact header snapshot entry.
//!
//! Layout (all fields little-endian):
//!
//! | bytes  | field       |
//! |--------|-------------|
//! | 0..4   | version     |
//! | 4..36  | prev hash   |
//! | 36..68 | merkle root |
//! | 68..72 | time        |
//! | 72..76 | bits        |
//! | 76..80 | nonce       |

use serde::{Deserialize, Serialize};
use spv_primitives::chainhash::{double_hash_h, Hash};
use spv_primitives::util::{ByteReader, ByteWriter};

use crate::error::HeaderError;

/// Size of a serialized block header in bytes.
pub const HEADER_SIZE: usize = 80;

/// A parsed block header.
///
/// Hash fields hold internal (little-endian) bytes exactly as they sit in
/// the serialized header; their `Display` is the big-endian form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_hash: Hash,
    pub merkle_root: Hash,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Parse a header from exactly 80 bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, HeaderError> {
        if data.len() != HEADER_SIZE {
            return Err(HeaderError::InvalidLength(data.len()));
        }
        let mut reader = ByteReader::new(data);
        let eof = |_| HeaderError::InvalidLength(data.len());
        let version = reader.read_i32_le().map_err(eof)?;
        let prev_hash = Hash::new(reader.read_array32().map_err(eof)?);
        let merkle_root = Hash::new(reader.read_array32().map_err(eof)?);
        let time = reader.read_u32_le().map_err(eof)?;
        let bits = reader.read_u32_le().map_err(eof)?;
        let nonce = reader.read_u32_le().map_err(eof)?;
        Ok(BlockHeader { version, prev_hash, merkle_root, time, bits, nonce })
    }

    /// Parse a header from hex, accepting an optional `0x` prefix.
    pub fn from_hex(header_hex: &str) -> Result<Self, HeaderError> {
        let trimmed = header_hex.strip_prefix("0x").unwrap_or(header_hex);
        let bytes = hex::decode(trimmed).map_err(|e| HeaderError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize back to the 80-byte wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(HEADER_SIZE);
        writer.write_i32_le(self.version);
        writer.write_bytes(self.prev_hash.as_bytes());
        writer.write_bytes(self.merkle_root.as_bytes());
        writer.write_u32_le(self.time);
        writer.write_u32_le(self.bits);
        writer.write_u32_le(self.nonce);
        writer.into_bytes()
    }

    /// Serialize to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Block hash: double SHA-256 of the serialized header.
    pub fn block_hash(&self) -> Hash {
        double_hash_h(&self.to_bytes())
    }
}

/// One entry of a header snapshot.
///
/// Mirror files carry the raw header and its timestamp; record-only
/// snapshots omit both. When `raw` is present the loader checks that the
/// declared hashes agree with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    pub hash: Hash,
    pub prev_hash: Hash,
    pub merkle_root: Hash,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
}

impl CompactHeader {
    /// Build a snapshot entry from a parsed header at `height`.
    pub fn from_block_header(header: &BlockHeader, height: u32) -> Self {
        CompactHeader {
            raw: Some(header.to_hex()),
            hash: header.block_hash(),
            prev_hash: header.prev_hash,
            merkle_root: header.merkle_root,
            height,
            time: Some(header.time),
        }
    }
}
