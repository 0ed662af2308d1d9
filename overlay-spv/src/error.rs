//! Service error types.

use spv_headers::LoadError;

/// Errors loading or validating an [`OverlayConfig`](crate::OverlayConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that prevent the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The first header snapshot could not be loaded.
    #[error("header snapshot unavailable: {0}")]
    Headers(#[from] LoadError),
}
