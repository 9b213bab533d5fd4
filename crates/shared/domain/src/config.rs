//! Layered configuration: a TOML file overlaid with `PACKRAT__*` environment
//! variables (double underscore for nesting, e.g. `PACKRAT__KDF__ITERATIONS`).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default PBKDF2 iteration count (OWASP recommendation for HMAC-SHA256).
pub const DEFAULT_KDF_ITERATIONS: u32 = 600_000;

/// Default cap on accepted import bundle size (bytes).
pub const DEFAULT_MAX_BUNDLE_BYTES: usize = 1_048_576;

/// Custom error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Top-level configuration shared across subsystems.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackratConfig {
    pub kdf: KdfConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub import: ImportConfig,
}

/// Key-derivation tunables. Iterations are stored in the vault metadata, so
/// raising this only affects newly initialized or rotated vaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    pub iterations: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self { iterations: DEFAULT_KDF_ITERATIONS }
    }
}

/// Remote vault API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { base_url: String::new(), timeout_secs: 30 }
    }
}

/// Local persistence root for the file-backed store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data") }
    }
}

/// Bounds on externally supplied bundles.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub max_bundle_bytes: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { max_bundle_bytes: DEFAULT_MAX_BUNDLE_BYTES }
    }
}

/// Loads configuration from an optional file plus `PACKRAT__*` environment
/// overrides.
///
/// # Errors
/// Returns [`ConfigError`] if the file exists but cannot be parsed, or the
/// merged settings do not deserialize into [`PackratConfig`].
pub fn load_config(path: Option<impl AsRef<Path>>) -> Result<PackratConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        info!("loading config from {}", path.as_ref().display());
        builder = builder.add_source(File::from(path.as_ref()).required(true));
    }
    let merged = builder
        .add_source(Environment::with_prefix("PACKRAT").separator("__"))
        .build()?
        .try_deserialize::<PackratConfig>()?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = PackratConfig::default();
        assert_eq!(cfg.kdf.iterations, DEFAULT_KDF_ITERATIONS);
        assert_eq!(cfg.import.max_bundle_bytes, DEFAULT_MAX_BUNDLE_BYTES);
        assert_eq!(cfg.sync.timeout_secs, 30);
    }

    #[test]
    fn loads_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packrat.toml");
        std::fs::write(&path, "[kdf]\niterations = 310000\n").unwrap();

        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.kdf.iterations, 310_000);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.import.max_bundle_bytes, DEFAULT_MAX_BUNDLE_BYTES);
    }
}
