//! Manifest, declaration and parent-edge storage.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use spv_primitives::chainhash::Hash;

use crate::error::StoreError;
use crate::types::VersionId;

/// A stored dataset manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestRecord {
    pub manifest_hash: String,
    pub content_hash: String,
    /// Manifest document as JSON text.
    pub manifest_json: String,
}

/// The on-chain declaration of a version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub txid: Hash,
    pub raw_tx: Vec<u8>,
    /// Serialized SPV envelope, once a proof has been attached.
    pub proof_json: Option<String>,
    pub opret_vout: u32,
}

/// Source of lineage data for the bundle builder.
///
/// Implementors may be a database, an overlay lookup or an in-memory map.
/// `Ok(None)` means the record does not exist; `Err` means the backend
/// could not answer.
pub trait LineageStore {
    fn manifest(&self, id: &VersionId) -> Result<Option<ManifestRecord>, StoreError>;

    fn declaration(&self, id: &VersionId) -> Result<Option<Declaration>, StoreError>;

    /// Direct parents of `id`, in stored order. Unknown versions have none.
    fn parents(&self, id: &VersionId) -> Result<Vec<VersionId>, StoreError>;
}

impl<T: LineageStore + ?Sized> LineageStore for Arc<T> {
    fn manifest(&self, id: &VersionId) -> Result<Option<ManifestRecord>, StoreError> {
        (**self).manifest(id)
    }

    fn declaration(&self, id: &VersionId) -> Result<Option<Declaration>, StoreError> {
        (**self).declaration(id)
    }

    fn parents(&self, id: &VersionId) -> Result<Vec<VersionId>, StoreError> {
        (**self).parents(id)
    }
}

#[derive(Default)]
struct Tables {
    manifests: HashMap<VersionId, ManifestRecord>,
    declarations: HashMap<VersionId, Declaration>,
    parents: HashMap<VersionId, Vec<VersionId>>,
}

/// In-memory [`LineageStore`].
#[derive(Default)]
pub struct MemoryLineageStore {
    tables: RwLock<Tables>,
}

impl MemoryLineageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_manifest(&self, id: VersionId, record: ManifestRecord) {
        self.tables.write().manifests.insert(id, record);
    }

    pub fn insert_declaration(&self, id: VersionId, declaration: Declaration) {
        self.tables.write().declarations.insert(id, declaration);
    }

    /// Attach or replace the proof of an existing declaration.
    ///
    /// Returns `false` if `id` has no declaration.
    pub fn attach_proof(&self, id: &VersionId, proof_json: String) -> bool {
        match self.tables.write().declarations.get_mut(id) {
            Some(decl) => {
                decl.proof_json = Some(proof_json);
                true
            }
            None => false,
        }
    }

    pub fn set_parents(&self, id: VersionId, parents: Vec<VersionId>) {
        self.tables.write().parents.insert(id, parents);
    }

    pub fn remove_manifest(&self, id: &VersionId) -> Option<ManifestRecord> {
        self.tables.write().manifests.remove(id)
    }
}

impl LineageStore for MemoryLineageStore {
    fn manifest(&self, id: &VersionId) -> Result<Option<ManifestRecord>, StoreError> {
        Ok(self.tables.read().manifests.get(id).cloned())
    }

    fn declaration(&self, id: &VersionId) -> Result<Option<Declaration>, StoreError> {
        Ok(self.tables.read().declarations.get(id).cloned())
    }

    fn parents(&self, id: &VersionId) -> Result<Vec<VersionId>, StoreError> {
        Ok(self.tables.read().parents.get(id).cloned().unwrap_or_default())
    }
}

impl std::fmt::Debug for MemoryLineageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("MemoryLineageStore")
            .field("manifests", &tables.manifests.len())
            .field("declarations", &tables.declarations.len())
            .finish()
    }
}
