//! Service configuration, read from TOML.
//!
//! ```toml
//! [headers]
//! source = { file = "./data/headers.json" }
//! reload_interval_ms = 5000
//! fetch_timeout_ms = 3000
//!
//! [bundles]
//! ttl_secs = 300
//! default_depth = 8
//! max_depth = 10
//!
//! [policy]
//! min_confs = 1
//! ```
//!
//! Every field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spv_headers::SnapshotSource;
use spv_lineage::DEFAULT_MAX_DEPTH;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub headers: HeadersConfig,

    #[serde(default)]
    pub bundles: BundlesConfig,

    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Header snapshot source and refresh cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadersConfig {
    #[serde(default = "default_source")]
    pub source: SnapshotSource,

    /// Hot-reload interval in milliseconds.
    #[serde(default = "default_reload_interval_ms")]
    pub reload_interval_ms: u64,

    /// Upper bound on a single snapshot fetch, in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

/// Bundle cache and traversal limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlesConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Depth used when a request does not name one.
    #[serde(default = "default_depth")]
    pub default_depth: u32,

    /// Requested depths are clamped to this.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Confirmations every proof in a served bundle must have.
    #[serde(default = "default_min_confs")]
    pub min_confs: u32,
}

fn default_source() -> SnapshotSource {
    SnapshotSource::File(PathBuf::from("./data/headers.json"))
}

const fn default_reload_interval_ms() -> u64 {
    5_000
}

const fn default_fetch_timeout_ms() -> u64 {
    3_000
}

const fn default_ttl_secs() -> u64 {
    300
}

const fn default_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

const fn default_max_depth() -> u32 {
    10
}

const fn default_min_confs() -> u32 {
    1
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            reload_interval_ms: default_reload_interval_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl Default for BundlesConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            default_depth: default_depth(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self { min_confs: default_min_confs() }
    }
}

impl HeadersConfig {
    pub fn reload_interval(&self) -> Duration {
        Duration::from_millis(self.reload_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl BundlesConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Depth to traverse for a request asking for `requested`.
    pub fn effective_depth(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_depth).min(self.max_depth)
    }
}

impl OverlayConfig {
    /// Parse a TOML document and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML, has fields of the
    /// wrong type, or fails [`validate`](Self::validate).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.headers.reload_interval_ms == 0 {
            return Err(ConfigError::Invalid("headers.reload_interval_ms must be positive".into()));
        }
        if self.headers.fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid("headers.fetch_timeout_ms must be positive".into()));
        }
        if self.bundles.ttl_secs == 0 {
            return Err(ConfigError::Invalid("bundles.ttl_secs must be positive".into()));
        }
        if self.bundles.default_depth > self.bundles.max_depth {
            return Err(ConfigError::Invalid(format!(
                "bundles.default_depth {} exceeds bundles.max_depth {}",
                self.bundles.default_depth, self.bundles.max_depth
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OverlayConfig::from_toml_str("").unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.headers.reload_interval(), Duration::from_secs(5));
        assert_eq!(config.headers.fetch_timeout(), Duration::from_secs(3));
        assert_eq!(config.bundles.ttl(), Duration::from_secs(300));
        assert_eq!(config.bundles.default_depth, 8);
        assert_eq!(config.bundles.max_depth, 10);
        assert_eq!(config.policy.min_confs, 1);
    }

    #[test]
    fn test_full_document() {
        let config = OverlayConfig::from_toml_str(
            r#"
            [headers]
            source = { url = "https://mirror.example/headers.json" }
            reload_interval_ms = 1000
            fetch_timeout_ms = 250

            [bundles]
            ttl_secs = 60
            default_depth = 4
            max_depth = 6

            [policy]
            min_confs = 3
            "#,
        )
        .unwrap();
        assert_eq!(
            config.headers.source,
            SnapshotSource::Url("https://mirror.example/headers.json".into())
        );
        assert_eq!(config.headers.fetch_timeout(), Duration::from_millis(250));
        assert_eq!(config.bundles.ttl(), Duration::from_secs(60));
        assert_eq!(config.policy.min_confs, 3);
    }

    #[test]
    fn test_file_source_and_partial_section() {
        let config = OverlayConfig::from_toml_str(
            r#"
            [headers]
            source = { file = "/var/lib/headers.json" }
            "#,
        )
        .unwrap();
        assert_eq!(config.headers.source, SnapshotSource::File("/var/lib/headers.json".into()));
        assert_eq!(config.headers.reload_interval_ms, 5000);
    }

    #[test]
    fn test_effective_depth() {
        let bundles = BundlesConfig::default();
        assert_eq!(bundles.effective_depth(None), 8);
        assert_eq!(bundles.effective_depth(Some(3)), 3);
        assert_eq!(bundles.effective_depth(Some(50)), 10);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            OverlayConfig::from_toml_str("[bundles]\ndefault_depth = 12\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            OverlayConfig::from_toml_str("[headers]\nfetch_timeout_ms = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            OverlayConfig::from_toml_str("[policy]\nmin_confs = \"one\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.toml");
        let mut config = OverlayConfig::default();
        config.policy.min_confs = 6;
        config.to_file(&path).unwrap();
        assert_eq!(OverlayConfig::from_file(&path).unwrap(), config);
        assert!(matches!(
            OverlayConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
