//! Persisted shape of the local vault.
//!
//! Everything in this module is ciphertext or public key-derivation metadata.
//! The whole [`LocalVault`] is stored as one JSON document under
//! [`VAULT_KEY`] in a [`packrat_storage::KeyValueStore`].

use std::collections::BTreeMap;

use packrat_crypto::EncryptedBlob;
use packrat_domain::RecordKind;
use serde::{Deserialize, Serialize};

/// Store key the local vault document lives under.
pub const VAULT_KEY: &str = "vault_v1";

/// Current vault metadata schema version.
pub const VAULT_META_VERSION: u32 = 1;

/// Name of the key-derivation function recorded in the metadata.
pub const KDF_NAME: &str = "PBKDF2";

/// Hash recorded in [`KdfParams`].
pub const KDF_HASH: &str = "SHA-256";

/// Salt length for passphrase derivation.
pub const KDF_SALT_LEN: usize = 16;

/// Public key-derivation parameters. Stored alongside the salt so unlock
/// works with whatever iteration count the vault was created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    pub iterations: u32,
    pub hash: String,
}

/// Vault header: how to derive the passphrase key, plus the master key
/// wrapped under the passphrase-derived key and under the recovery key.
///
/// The master key itself never appears here in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMeta {
    pub version: u32,
    pub kdf_name: String,
    #[serde(with = "b64")]
    pub kdf_salt: Vec<u8>,
    pub kdf_params: KdfParams,
    pub wrapped_master_key_by_passphrase: EncryptedBlob,
    pub wrapped_master_key_by_recovery: EncryptedBlob,
}

/// The full local vault document: header plus one encrypted blob per record
/// collection that has ever been saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVault {
    pub meta: VaultMeta,
    #[serde(default)]
    pub blobs: BTreeMap<RecordKind, EncryptedBlob>,
}

mod b64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(de)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
