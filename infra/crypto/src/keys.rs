use aead::{Key, KeyInit};
use aes_gcm::Aes256Gcm;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::rand::random_array;

/// Symmetric key length (256-bit).
pub const KEY_LEN: usize = 32;

/// Raw 256-bit symmetric key material.
///
/// A `MasterKey` exists only in memory for the duration of an unlocked
/// session. It is never persisted in plaintext and is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_LEN]);

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

impl MasterKey {
    /// Wraps raw key material as a usable key handle.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Wraps raw key material, validating only the length.
    ///
    /// # Errors
    /// Returns [`CryptoError::InvalidLength`] if `bytes` is not 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; KEY_LEN] =
            bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                what: "key",
                expected: KEY_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Generates a fresh random master key.
    ///
    /// # Errors
    /// Returns [`CryptoError::Rng`] if the operating system RNG is unavailable.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self(random_array()?))
    }

    /// Exposes the raw key bytes (needed to wrap the key under another key).
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Instantiates the AEAD cipher for this key.
    pub(crate) fn cipher(&self) -> Result<Aes256Gcm, CryptoError> {
        let key = Key::<Aes256Gcm>::try_from(&self.0[..]).map_err(|_| {
            CryptoError::InvalidLength { what: "key", expected: KEY_LEN, actual: self.0.len() }
        })?;
        Ok(Aes256Gcm::new(&key))
    }
}
