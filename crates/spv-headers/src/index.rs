//! Immutable header index built from a validated snapshot.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use spv_primitives::chainhash::Hash;

use crate::error::LoadError;
use crate::header::{BlockHeader, CompactHeader};

/// Indexed view of one header.
///
/// `merkle_root` is optional because `byHash` snapshots may omit it; the
/// envelope verifier reports such blocks as `merkle-root-unavailable`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderRecord {
    pub hash: Hash,
    pub prev_hash: Hash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_root: Option<Hash>,
    pub height: u32,
}

impl From<&CompactHeader> for HeaderRecord {
    fn from(h: &CompactHeader) -> Self {
        HeaderRecord {
            hash: h.hash,
            prev_hash: h.prev_hash,
            merkle_root: Some(h.merkle_root),
            height: h.height,
        }
    }
}

/// Record as it appears under a `byHash` key. The hash itself is the key.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapRecord {
    #[serde(default)]
    hash: Option<Hash>,
    prev_hash: Hash,
    #[serde(default)]
    merkle_root: Option<Hash>,
    height: u32,
}

/// Immutable index over a header snapshot.
///
/// Built once per snapshot load and never mutated; a reload produces a new
/// index that replaces this one wholesale.
#[derive(Clone, Debug)]
pub struct HeadersIndex {
    best_height: u32,
    tip_hash: Hash,
    by_hash: HashMap<Hash, HeaderRecord>,
    by_height: BTreeMap<u32, HeaderRecord>,
}

impl HeadersIndex {
    /// Parse and validate a snapshot document.
    ///
    /// Accepted shapes:
    /// - a bare array of [`CompactHeader`]
    /// - `{ bestHeight?, tipHash?, headers: [CompactHeader] }`
    /// - `{ bestHeight, tipHash, byHash: { <hash>: { prevHash, merkleRoot?, height } } }`
    ///
    /// Any broken link, height gap or inconsistent field rejects the whole
    /// snapshot.
    pub fn from_snapshot_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let doc: Value = serde_json::from_slice(bytes)?;
        match doc {
            Value::Array(items) => {
                let headers = parse_headers(items)?;
                Self::from_chain(&headers)
            }
            Value::Object(mut obj) => {
                if let Some(headers) = obj.remove("headers") {
                    let Value::Array(items) = headers else {
                        return Err(LoadError::UnknownShape("headers is not an array".into()));
                    };
                    let headers = parse_headers(items)?;
                    let index = Self::from_chain(&headers)?;
                    check_declared_tip(&obj, &index)?;
                    Ok(index)
                } else if let Some(by_hash) = obj.remove("byHash") {
                    let best_height: u32 = required_field(&obj, "bestHeight")?;
                    let tip_hash: Hash = required_field(&obj, "tipHash")?;
                    Self::from_map(best_height, tip_hash, by_hash)
                } else {
                    Err(LoadError::UnknownShape(
                        "expected a headers array or a byHash map".into(),
                    ))
                }
            }
            _ => Err(LoadError::UnknownShape("snapshot is not an array or object".into())),
        }
    }

    /// Build an index from an ordered header chain.
    ///
    /// The chain must be non-empty, every `prev_hash` must link to the
    /// previous entry's `hash`, heights must increase by exactly one, and
    /// entries carrying a raw header must agree with it.
    pub fn from_chain(headers: &[CompactHeader]) -> Result<Self, LoadError> {
        for (index, header) in headers.iter().enumerate() {
            check_raw(index, header)?;
        }
        validate_chain(headers)?;
        let tip = headers.last().ok_or(LoadError::Empty)?;

        let mut by_hash = HashMap::with_capacity(headers.len());
        let mut by_height = BTreeMap::new();
        for header in headers {
            let record = HeaderRecord::from(header);
            by_height.insert(record.height, record.clone());
            by_hash.insert(record.hash, record);
        }

        Ok(HeadersIndex {
            best_height: tip.height,
            tip_hash: tip.hash,
            by_hash,
            by_height,
        })
    }

    fn from_map(best_height: u32, tip_hash: Hash, by_hash: Value) -> Result<Self, LoadError> {
        let Value::Object(entries) = by_hash else {
            return Err(LoadError::UnknownShape("byHash is not an object".into()));
        };
        if entries.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut index = HeadersIndex {
            best_height,
            tip_hash,
            by_hash: HashMap::with_capacity(entries.len()),
            by_height: BTreeMap::new(),
        };
        for (key, value) in entries {
            let hash = Hash::from_hex(&key).map_err(|e| LoadError::InvalidKey {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            let rec: MapRecord = serde_json::from_value(value).map_err(|e| LoadError::InvalidKey {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            if rec.hash.is_some_and(|declared| declared != hash) {
                return Err(LoadError::InvalidKey {
                    key,
                    reason: "record hash does not match key".into(),
                });
            }
            let record = HeaderRecord {
                hash,
                prev_hash: rec.prev_hash,
                merkle_root: rec.merkle_root,
                height: rec.height,
            };
            if index.by_height.insert(record.height, record.clone()).is_some() {
                return Err(LoadError::DuplicateHeight(record.height));
            }
            index.by_hash.insert(hash, record);
        }
        Ok(index)
    }

    /// Height of the best (tip) block.
    pub fn best_height(&self) -> u32 {
        self.best_height
    }

    /// Hash of the tip block.
    pub fn tip_hash(&self) -> Hash {
        self.tip_hash
    }

    /// Number of indexed headers.
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    /// Look up a header by block hash.
    pub fn get_header(&self, hash: &Hash) -> Option<&HeaderRecord> {
        self.by_hash.get(hash)
    }

    /// Look up a header by height.
    pub fn header_by_height(&self, height: u32) -> Option<&HeaderRecord> {
        self.by_height.get(&height)
    }

    /// Confirmations for a block: `max(0, best_height - height + 1)`.
    ///
    /// Unknown hashes have zero confirmations, as does any block above the
    /// current best height.
    pub fn get_confirmations(&self, hash: &Hash) -> u32 {
        match self.by_hash.get(hash) {
            Some(record) => confirmations_at(self.best_height, record.height),
            None => 0,
        }
    }
}

/// `max(0, best - height + 1)` without underflow.
pub(crate) fn confirmations_at(best_height: u32, height: u32) -> u32 {
    if height > best_height {
        0
    } else {
        best_height - height + 1
    }
}

fn parse_headers(items: Vec<Value>) -> Result<Vec<CompactHeader>, LoadError> {
    if items.is_empty() {
        return Err(LoadError::Empty);
    }
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| LoadError::InvalidHeader { index, reason: e.to_string() })
        })
        .collect()
}

/// When a raw header is supplied, the declared fields must be derivable from it.
fn check_raw(index: usize, header: &CompactHeader) -> Result<(), LoadError> {
    let Some(raw) = header.raw.as_deref() else {
        return Ok(());
    };
    let parsed = BlockHeader::from_hex(raw)
        .map_err(|e| LoadError::InvalidHeader { index, reason: e.to_string() })?;
    if parsed.block_hash() != header.hash {
        return Err(LoadError::HeaderMismatch { index, field: "hash" });
    }
    if parsed.prev_hash != header.prev_hash {
        return Err(LoadError::HeaderMismatch { index, field: "prevHash" });
    }
    if parsed.merkle_root != header.merkle_root {
        return Err(LoadError::HeaderMismatch { index, field: "merkleRoot" });
    }
    if header.time.is_some_and(|t| t != parsed.time) {
        return Err(LoadError::HeaderMismatch { index, field: "time" });
    }
    Ok(())
}

fn validate_chain(headers: &[CompactHeader]) -> Result<(), LoadError> {
    if headers.is_empty() {
        return Err(LoadError::Empty);
    }
    for (index, pair) in headers.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let index = index + 1;
        if cur.prev_hash != prev.hash {
            return Err(LoadError::ChainBreak {
                index,
                prev_hash: cur.prev_hash,
                expected: prev.hash,
            });
        }
        if prev.height.checked_add(1) != Some(cur.height) {
            return Err(LoadError::BadHeight {
                index,
                height: cur.height,
                prev_height: prev.height,
            });
        }
    }
    Ok(())
}

fn check_declared_tip(
    obj: &serde_json::Map<String, Value>,
    index: &HeadersIndex,
) -> Result<(), LoadError> {
    if let Some(declared) = optional_field::<u32>(obj, "bestHeight")? {
        if declared != index.best_height {
            return Err(LoadError::TipMismatch(format!(
                "bestHeight {} but last header is at {}",
                declared, index.best_height
            )));
        }
    }
    if let Some(declared) = optional_field::<Hash>(obj, "tipHash")? {
        if declared != index.tip_hash {
            return Err(LoadError::TipMismatch(format!(
                "tipHash {} but last header is {}",
                declared, index.tip_hash
            )));
        }
    }
    Ok(())
}

fn optional_field<T: serde::de::DeserializeOwned>(
    obj: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<Option<T>, LoadError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| LoadError::UnknownShape(format!("{}: {}", name, e))),
    }
}

fn required_field<T: serde::de::DeserializeOwned>(
    obj: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<T, LoadError> {
    optional_field(obj, name)?
        .ok_or_else(|| LoadError::UnknownShape(format!("missing {}", name)))
}
