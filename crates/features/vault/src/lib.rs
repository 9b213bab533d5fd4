//! Vault feature: lifecycle, encrypted record codec, export/import bundles.
//!
//! The vault is a single JSON document in a [`packrat_storage::KeyValueStore`]:
//! a header ([`VaultMeta`]) carrying key-derivation parameters and the master
//! key wrapped under two credentials, plus one [`packrat_crypto::EncryptedBlob`]
//! per record collection. [`VaultKeeper`] is the service in front of it:
//!
//! ```text
//! passphrase ── PBKDF2 ──┐
//!                        ├── unwrap ──> MasterKey ── AES-GCM ──> records
//! recovery key (hex) ────┘
//! ```
//!
//! The master key is generated once at [`VaultKeeper::initialize`] and only
//! ever re-wrapped; rotating the passphrase never re-encrypts data.

mod bundle;
mod error;
mod keeper;
mod model;

pub use bundle::{
    BUNDLE_VERSION, ExportBundle, build_export_bundle, import_bundle, validate_bundle_from_text,
};
pub use error::VaultError;
pub use keeper::{RECOVERY_KEY_LEN, VaultKeeper};
pub use model::{
    KDF_HASH, KDF_NAME, KDF_SALT_LEN, KdfParams, LocalVault, VAULT_KEY, VAULT_META_VERSION,
    VaultMeta,
};
