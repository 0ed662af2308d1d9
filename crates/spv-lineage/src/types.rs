//! Lineage graph and bundle types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use spv_primitives::chainhash::Hash;
use spv_primitives::PrimitivesError;
use spv_verify::SpvEnvelope;

/// Value of [`Bundle::bundle_type`].
pub const BUNDLE_TYPE: &str = "datasetLineageBundle";

/// Identifier of a dataset version: 32 bytes, written as 64 lowercase hex
/// characters in natural byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionId([u8; 32]);

impl VersionId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex id. Upper-case input is accepted.
    pub fn from_hex(s: &str) -> Result<Self, PrimitivesError> {
        if s.len() != 64 {
            return Err(PrimitivesError::InvalidLength { expected: 64, got: s.len() });
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionId({self})")
    }
}

impl FromStr for VersionId {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for VersionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VersionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A version in the lineage graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageNode {
    pub version_id: VersionId,
    pub manifest_hash: String,
    /// Declaring output as `txid:vout`.
    pub txo: String,
}

impl LineageNode {
    pub fn txo_for(txid: &Hash, vout: u32) -> String {
        format!("{txid}:{vout}")
    }
}

/// `child` was derived from `parent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineageEdge {
    pub child: VersionId,
    pub parent: VersionId,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageGraph {
    pub nodes: Vec<LineageNode>,
    pub edges: Vec<LineageEdge>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub manifest_hash: String,
    pub manifest: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofEntry {
    pub version_id: VersionId,
    pub envelope: SpvEnvelope,
}

/// A version's ancestry with manifests and inclusion proofs.
///
/// The graph, manifests and proofs are fixed once built. `confs_used`,
/// `best_height` and each `envelope.confirmations` are recomputed whenever
/// the bundle is verified and must not be trusted from storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub bundle_type: String,
    pub target: VersionId,
    pub graph: LineageGraph,
    pub manifests: Vec<ManifestEntry>,
    pub proofs: Vec<ProofEntry>,
    /// Lowest confirmation count across all proofs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confs_used: Option<u32>,
    /// Tip height of the snapshot the confirmations were computed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_height: Option<u32>,
}

impl Bundle {
    /// An empty, unverified bundle for `target`.
    pub fn new(target: VersionId) -> Self {
        Self {
            bundle_type: BUNDLE_TYPE.to_string(),
            target,
            graph: LineageGraph::default(),
            manifests: Vec::new(),
            proofs: Vec::new(),
            confs_used: None,
            best_height: None,
        }
    }

    pub fn node(&self, id: &VersionId) -> Option<&LineageNode> {
        self.graph.nodes.iter().find(|n| n.version_id == *id)
    }

    pub fn proof(&self, id: &VersionId) -> Option<&SpvEnvelope> {
        self.proofs.iter().find(|p| p.version_id == *id).map(|p| &p.envelope)
    }
}
