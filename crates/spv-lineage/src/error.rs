//! Lineage build errors.

use spv_verify::VerifyReason;

use crate::types::VersionId;

/// Failure reported by a [`LineageStore`](crate::store::LineageStore) backend.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

/// Why a lineage bundle could not be built.
///
/// A build either returns a complete, fully verified bundle or one of these;
/// partial bundles are never produced.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildReason {
    #[error("missing-manifest:{0}")]
    MissingManifest(VersionId),

    /// No declaration, or a declaration without a proof.
    #[error("missing-envelope:{0}")]
    MissingEnvelope(VersionId),

    #[error("malformed-manifest:{version_id}: {detail}")]
    MalformedManifest { version_id: VersionId, detail: String },

    #[error("malformed-envelope:{version_id}: {detail}")]
    MalformedEnvelope { version_id: VersionId, detail: String },

    #[error("invalid-envelope:{version_id}:{reason}")]
    InvalidEnvelope { version_id: VersionId, reason: VerifyReason },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BuildReason {
    /// Reason code without the version suffix.
    pub fn code(&self) -> &'static str {
        match self {
            BuildReason::MissingManifest(_) => "missing-manifest",
            BuildReason::MissingEnvelope(_) => "missing-envelope",
            BuildReason::MalformedManifest { .. } => "malformed-manifest",
            BuildReason::MalformedEnvelope { .. } => "malformed-envelope",
            BuildReason::InvalidEnvelope { .. } => "invalid-envelope",
            BuildReason::Store(_) => "store-error",
        }
    }

    /// The version the failure is attributed to, if any.
    pub fn version_id(&self) -> Option<&VersionId> {
        match self {
            BuildReason::MissingManifest(id) | BuildReason::MissingEnvelope(id) => Some(id),
            BuildReason::MalformedManifest { version_id, .. }
            | BuildReason::MalformedEnvelope { version_id, .. }
            | BuildReason::InvalidEnvelope { version_id, .. } => Some(version_id),
            BuildReason::Store(_) => None,
        }
    }

    /// The lineage is incomplete in the store, as opposed to present but invalid.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, BuildReason::MissingManifest(_) | BuildReason::MissingEnvelope(_))
    }
}
