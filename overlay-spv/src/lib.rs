//! Overlay SPV.
//!
//! Re-exports the SPV components and wires them into a
//! [`ProvenanceService`] driven by an [`OverlayConfig`].

pub use spv_headers as headers;
pub use spv_lineage as lineage;
pub use spv_primitives as primitives;
pub use spv_verify as verify;

pub mod config;
pub mod error;
pub mod service;

pub use config::{BundlesConfig, HeadersConfig, OverlayConfig, PolicyConfig};
pub use error::{ConfigError, ServiceError};
pub use service::{ProvenanceService, ReadyPolicy, ReadyReport};
