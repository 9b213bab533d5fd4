use std::collections::BTreeMap;
use std::sync::Arc;

use packrat_crypto::{
    KEY_LEN, MasterKey, decrypt, derive_key_from_passphrase, encrypt, random_array, random_bytes,
};
use packrat_domain::VaultRecord;
use packrat_storage::KeyValueStore;
use tracing::{debug, info};

use crate::error::VaultError;
use crate::model::{
    KDF_HASH, KDF_NAME, KDF_SALT_LEN, KdfParams, LocalVault, VAULT_KEY, VAULT_META_VERSION,
    VaultMeta,
};

/// Recovery key length in raw bytes; presented to the user as hex.
pub const RECOVERY_KEY_LEN: usize = KEY_LEN;

/// Vault lifecycle service: create, unlock, rotate, and the encrypted record
/// codec on top of a [`KeyValueStore`].
///
/// The master key is wrapped twice in the vault header: once under a
/// PBKDF2-derived passphrase key and once under the recovery key. The
/// recovery wrap does not depend on the passphrase salt, so rotating the
/// passphrase leaves it valid.
#[derive(Debug, Clone)]
pub struct VaultKeeper {
    store: Arc<dyn KeyValueStore>,
    kdf_iterations: u32,
}

impl VaultKeeper {
    pub fn new(store: Arc<dyn KeyValueStore>, kdf_iterations: u32) -> Self {
        Self { store, kdf_iterations }
    }

    /// Whether a local vault document exists in the store.
    ///
    /// # Errors
    /// Returns [`VaultError::Store`] if the store cannot be read.
    pub async fn has_vault(&self) -> Result<bool, VaultError> {
        Ok(self.store.get(VAULT_KEY).await?.is_some())
    }

    /// Creates a new vault: fresh master key, fresh salt, fresh recovery key.
    ///
    /// Returns the vault header and the recovery key as a 64-character hex
    /// string. The recovery key is shown exactly once and stored nowhere;
    /// losing both it and the passphrase makes the vault unrecoverable.
    ///
    /// # Errors
    /// Returns [`VaultError::AlreadyExists`] if a local vault is present.
    pub async fn initialize(&self, passphrase: &str) -> Result<(VaultMeta, String), VaultError> {
        if self.has_vault().await? {
            return Err(VaultError::AlreadyExists);
        }

        let master = MasterKey::generate()?;
        let recovery_bytes: [u8; RECOVERY_KEY_LEN] = random_array()?;
        let recovery_key = MasterKey::from_bytes(recovery_bytes);

        let salt = random_bytes(KDF_SALT_LEN)?;
        let passphrase_key = derive_key_from_passphrase(passphrase, &salt, self.kdf_iterations);

        let meta = VaultMeta {
            version: VAULT_META_VERSION,
            kdf_name: KDF_NAME.to_owned(),
            kdf_salt: salt,
            kdf_params: KdfParams { iterations: self.kdf_iterations, hash: KDF_HASH.to_owned() },
            wrapped_master_key_by_passphrase: encrypt(&passphrase_key, master.as_bytes())?,
            wrapped_master_key_by_recovery: encrypt(&recovery_key, master.as_bytes())?,
        };

        let vault = LocalVault { meta: meta.clone(), blobs: BTreeMap::new() };
        self.replace_local_vault(&vault).await?;
        info!("initialized new local vault");

        Ok((meta, hex::encode(recovery_bytes)))
    }

    /// Unlocks the vault with a passphrase.
    ///
    /// # Errors
    /// Returns [`VaultError::UnlockFailed`] for a wrong passphrase, a missing
    /// vault, or a corrupt vault; the cases are indistinguishable.
    pub async fn unlock_with_passphrase(&self, passphrase: &str) -> Result<MasterKey, VaultError> {
        let vault = self.vault_for_unlock().await?;
        let wrap_key = derive_key_from_passphrase(
            passphrase,
            &vault.meta.kdf_salt,
            vault.meta.kdf_params.iterations,
        );
        unwrap_master_key(&wrap_key, &vault.meta.wrapped_master_key_by_passphrase)
    }

    /// Unlocks the vault with the hex recovery key. Input is trimmed and
    /// case-insensitive.
    ///
    /// # Errors
    /// Returns [`VaultError::UnlockFailed`] for a wrong key, a missing vault,
    /// or a corrupt vault; the cases are indistinguishable.
    pub async fn unlock_with_recovery_key(&self, recovery: &str) -> Result<MasterKey, VaultError> {
        let vault = self.vault_for_unlock().await?;
        let wrap_key = recovery_wrapping_key(recovery)?;
        unwrap_master_key(&wrap_key, &vault.meta.wrapped_master_key_by_recovery)
    }

    /// Rotates the passphrase: new salt, new wrap of the same master key.
    ///
    /// Record blobs and the recovery wrap are untouched; nothing is
    /// re-encrypted. The old passphrase stops working immediately.
    ///
    /// # Errors
    /// Returns [`VaultError::NotFound`] if no local vault exists.
    pub async fn set_new_passphrase(
        &self,
        key: &MasterKey,
        new_passphrase: &str,
    ) -> Result<(), VaultError> {
        let mut vault = self.local_vault().await?.ok_or(VaultError::NotFound)?;

        let salt = random_bytes(KDF_SALT_LEN)?;
        let wrap_key = derive_key_from_passphrase(new_passphrase, &salt, self.kdf_iterations);
        vault.meta.kdf_salt = salt;
        vault.meta.kdf_params.iterations = self.kdf_iterations;
        vault.meta.wrapped_master_key_by_passphrase = encrypt(&wrap_key, key.as_bytes())?;

        self.replace_local_vault(&vault).await?;
        info!("passphrase rotated");
        Ok(())
    }

    /// Decrypts and normalizes one record collection.
    ///
    /// An absent blob yields an empty collection. When the normalizer had to
    /// repair the data, the corrected collection is re-encrypted and written
    /// back so the stored blob converges to the strict schema.
    ///
    /// # Errors
    /// Returns [`VaultError::Crypto`] if the blob fails authentication and
    /// [`VaultError::NotFound`] if no local vault exists.
    pub async fn load_records<T: VaultRecord>(
        &self,
        key: &MasterKey,
    ) -> Result<Vec<T>, VaultError> {
        let mut vault = self.local_vault().await?.ok_or(VaultError::NotFound)?;

        let raw = match vault.blobs.get(&T::KIND) {
            None => serde_json::Value::Null,
            Some(blob) => serde_json::from_slice(&decrypt(key, blob)?)?,
        };

        let normalized = T::normalize(raw);
        if normalized.changed {
            debug!(kind = %T::KIND, "stored records needed repair, writing back");
            let bytes = serde_json::to_vec(&normalized.value)?;
            vault.blobs.insert(T::KIND, encrypt(key, &bytes)?);
            self.replace_local_vault(&vault).await?;
        }

        Ok(normalized.value)
    }

    /// Replaces one record collection with a fresh-IV encryption.
    ///
    /// # Errors
    /// Returns [`VaultError::NotFound`] if no local vault exists.
    pub async fn save_records<T: VaultRecord>(
        &self,
        key: &MasterKey,
        records: &[T],
    ) -> Result<(), VaultError> {
        let mut vault = self.local_vault().await?.ok_or(VaultError::NotFound)?;
        let bytes = serde_json::to_vec(records)?;
        vault.blobs.insert(T::KIND, encrypt(key, &bytes)?);
        self.replace_local_vault(&vault).await
    }

    /// Reads the raw local vault document, if any.
    ///
    /// # Errors
    /// Returns [`VaultError::Serialization`] if the stored document is not
    /// valid vault JSON.
    pub async fn local_vault(&self) -> Result<Option<LocalVault>, VaultError> {
        match self.store.get(VAULT_KEY).await? {
            None => Ok(None),
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        }
    }

    /// Overwrites the local vault document wholesale. Used by rotation,
    /// record saves, bundle import, and sync download.
    ///
    /// # Errors
    /// Returns [`VaultError::Store`] if the store cannot be written.
    pub async fn replace_local_vault(&self, vault: &LocalVault) -> Result<(), VaultError> {
        let bytes = serde_json::to_vec(vault)?;
        self.store.set(VAULT_KEY, &bytes).await?;
        Ok(())
    }

    async fn vault_for_unlock(&self) -> Result<LocalVault, VaultError> {
        self.local_vault()
            .await
            .map_err(|_| VaultError::UnlockFailed)?
            .ok_or(VaultError::UnlockFailed)
    }
}

fn unwrap_master_key(
    wrap_key: &MasterKey,
    wrapped: &packrat_crypto::EncryptedBlob,
) -> Result<MasterKey, VaultError> {
    let raw = decrypt(wrap_key, wrapped).map_err(|_| VaultError::UnlockFailed)?;
    MasterKey::from_slice(&raw).map_err(|_| VaultError::UnlockFailed)
}

fn recovery_wrapping_key(input: &str) -> Result<MasterKey, VaultError> {
    let cleaned = input.trim().to_ascii_lowercase();
    let bytes = hex::decode(cleaned).map_err(|_| VaultError::UnlockFailed)?;
    MasterKey::from_slice(&bytes).map_err(|_| VaultError::UnlockFailed)
}
