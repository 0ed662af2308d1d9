//! Depth-bounded lineage traversal.

use std::collections::{HashMap, HashSet};

use spv_verify::{verify_envelope, ChainTracker, SpvEnvelope};
use tracing::debug;

use crate::error::BuildReason;
use crate::store::LineageStore;
use crate::types::{Bundle, LineageEdge, LineageNode, ManifestEntry, ProofEntry, VersionId};

/// Ancestor levels included when the caller does not ask for a depth.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Assembles [`Bundle`]s from a [`LineageStore`].
#[derive(Debug)]
pub struct LineageBundleBuilder<S> {
    store: S,
}

impl<S: LineageStore> LineageBundleBuilder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Collect the lineage of `root` and verify every proof against `chain`.
    ///
    /// Ancestors more than `max_depth` levels above `root` are left out.
    /// Any missing record or failing proof aborts the whole build.
    pub fn build<C: ChainTracker + ?Sized>(
        &self,
        root: &VersionId,
        max_depth: u32,
        chain: &C,
        min_confs: u32,
    ) -> Result<Bundle, BuildReason> {
        let mut bundle = self.collect(root, max_depth)?;
        verify_bundle(&mut bundle, chain, min_confs)?;
        debug!(
            target_version = %root,
            nodes = bundle.graph.nodes.len(),
            edges = bundle.graph.edges.len(),
            confs_used = bundle.confs_used,
            "bundle.built"
        );
        Ok(bundle)
    }

    /// Walk the lineage without verifying proofs.
    ///
    /// Iterative depth-first search. Each version is appended once, but is
    /// expanded again whenever it is reached at a shallower depth, so every
    /// ancestor within `max_depth` hops of `root` is included regardless of
    /// parent order. Each parent link is recorded as an edge once.
    pub fn collect(&self, root: &VersionId, max_depth: u32) -> Result<Bundle, BuildReason> {
        let mut bundle = Bundle::new(*root);
        let mut shallowest: HashMap<VersionId, u32> = HashMap::new();
        let mut recorded: HashSet<LineageEdge> = HashSet::new();
        let mut stack = vec![(*root, 0u32)];

        while let Some((id, depth)) = stack.pop() {
            match shallowest.get(&id) {
                Some(&seen) if seen <= depth => continue,
                Some(_) => {}
                None => self.append(&mut bundle, id)?,
            }
            shallowest.insert(id, depth);

            if depth >= max_depth {
                continue;
            }
            for parent in self.store.parents(&id)? {
                let edge = LineageEdge { child: id, parent };
                if recorded.insert(edge) {
                    bundle.graph.edges.push(edge);
                }
                let next = depth + 1;
                if shallowest.get(&parent).map_or(true, |&seen| next < seen) {
                    stack.push((parent, next));
                }
            }
        }

        Ok(bundle)
    }

    fn append(&self, bundle: &mut Bundle, id: VersionId) -> Result<(), BuildReason> {
        let manifest = self
            .store
            .manifest(&id)?
            .ok_or(BuildReason::MissingManifest(id))?;
        let declaration = self
            .store
            .declaration(&id)?
            .ok_or(BuildReason::MissingEnvelope(id))?;
        let proof_json = declaration
            .proof_json
            .as_deref()
            .ok_or(BuildReason::MissingEnvelope(id))?;

        let document = serde_json::from_str(&manifest.manifest_json).map_err(|e| {
            BuildReason::MalformedManifest { version_id: id, detail: e.to_string() }
        })?;
        let envelope = SpvEnvelope::from_json(proof_json).map_err(|e| {
            BuildReason::MalformedEnvelope { version_id: id, detail: e.to_string() }
        })?;

        bundle.graph.nodes.push(LineageNode {
            version_id: id,
            manifest_hash: manifest.manifest_hash.clone(),
            txo: LineageNode::txo_for(&declaration.txid, declaration.opret_vout),
        });
        bundle.manifests.push(ManifestEntry {
            manifest_hash: manifest.manifest_hash,
            manifest: document,
        });
        bundle.proofs.push(ProofEntry { version_id: id, envelope });
        Ok(())
    }
}

/// Re-verify every proof in `bundle` against `chain`.
///
/// Overwrites each `envelope.confirmations` and the bundle's `confs_used`
/// and `best_height`. Stops at the first failing proof; the bundle is then
/// left partially updated and must be discarded.
pub fn verify_bundle<C: ChainTracker + ?Sized>(
    bundle: &mut Bundle,
    chain: &C,
    min_confs: u32,
) -> Result<(), BuildReason> {
    let mut confs_used: Option<u32> = None;
    for entry in &mut bundle.proofs {
        let verified = verify_envelope(&entry.envelope, chain, min_confs).map_err(|reason| {
            BuildReason::InvalidEnvelope { version_id: entry.version_id, reason }
        })?;
        entry.envelope.confirmations = Some(verified.confirmations);
        confs_used = Some(confs_used.map_or(verified.confirmations, |c| c.min(verified.confirmations)));
    }
    bundle.confs_used = confs_used;
    bundle.best_height = Some(chain.current_height());
    Ok(())
}
