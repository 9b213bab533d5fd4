//! Facade crate for the PackRat encrypted vault.
//! Re-exports the feature and infrastructure crates and offers small
//! composition helpers. Keep this crate thin: it should compose other
//! crates, not implement vault logic.
//!
//! ## Usage
//! - Load configuration with `domain::config::load_config`.
//! - Build a keeper with [`open_file_vault`] and a remote client with
//!   [`remote_api`], then hand both to `sync::MigrationRunner`.

pub use packrat_crypto as crypto;
pub use packrat_domain as domain;
pub use packrat_logger as logger;
pub use packrat_storage as storage;
pub use packrat_sync as sync;
pub use packrat_vault as vault;

use std::sync::Arc;
use std::time::Duration;

use domain::config::PackratConfig;

/// Everything a typical embedder needs, one `use` away.
pub mod prelude {
    pub use packrat_crypto::{EncryptedBlob, MasterKey};
    pub use packrat_domain::config::{PackratConfig, load_config};
    pub use packrat_domain::{
        AddressRecord, MobileNumberRecord, RecordKind, SubscriptionRecord, Todo, VaultRecord,
    };
    pub use packrat_storage::{FileStore, KeyValueStore, MemoryStore};
    pub use packrat_sync::{
        ConflictChoice, HttpVaultApi, MigrationOutcome, MigrationPrompt, MigrationRunner,
        SyncError, VaultApi,
    };
    pub use packrat_vault::{ExportBundle, VaultError, VaultKeeper, VaultMeta};
}

/// Opens a file-backed vault keeper rooted at the configured data directory.
///
/// # Errors
/// Returns [`vault::VaultError::Store`] if the data directory cannot be
/// created.
pub async fn open_file_vault(config: &PackratConfig) -> Result<vault::VaultKeeper, vault::VaultError> {
    let store = storage::FileStore::open(config.storage.data_dir.clone()).await?;
    Ok(vault::VaultKeeper::new(Arc::new(store), config.kdf.iterations))
}

/// Builds the HTTP vault client from configuration.
///
/// # Errors
/// Returns [`sync::SyncError::Network`] if the client cannot be constructed.
pub fn remote_api(config: &PackratConfig) -> Result<sync::HttpVaultApi, sync::SyncError> {
    sync::HttpVaultApi::new(
        &config.sync.base_url,
        Duration::from_secs(config.sync.timeout_secs),
    )
}
