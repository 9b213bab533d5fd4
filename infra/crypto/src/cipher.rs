use aead::inout::InOutBuf;
use aead::{AeadInOut, Nonce};
use aes_gcm::Aes256Gcm;
use getrandom::fill;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::keys::MasterKey;

/// AEAD nonce length (96-bit).
pub const IV_LEN: usize = 12;

/// AEAD tag length (128-bit), appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// One authenticated-encryption unit: a random IV plus ciphertext-with-tag.
///
/// Both fields are serialized as base64 strings so blobs embed directly into
/// the vault JSON and the wire protocol. Invariant: `iv` is exactly
/// [`IV_LEN`] bytes; decryption fails authentication if either field was
/// tampered with.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    #[serde(with = "b64")]
    pub iv: Vec<u8>,
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedBlob")
            .field("iv_len", &self.iv.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

/// Encrypts `plaintext` under `key` with a freshly generated random IV.
///
/// Every call draws a new IV from the system CSPRNG; IV reuse under one key
/// is a correctness violation, so no caller-supplied IV is accepted.
///
/// # Errors
/// Returns [`CryptoError::Rng`] if the system RNG is unavailable and
/// [`CryptoError::EncryptionFailed`] if the AEAD operation fails.
pub fn encrypt(key: &MasterKey, plaintext: &[u8]) -> Result<EncryptedBlob, CryptoError> {
    let cipher = key.cipher()?;
    let nonce = next_iv()?;

    let mut buf = plaintext.to_vec();
    let tag = cipher
        .encrypt_inout_detached(&nonce, b"", InOutBuf::from(&mut buf[..]))
        .map_err(|_| CryptoError::EncryptionFailed)?;
    buf.extend_from_slice(tag.as_slice());

    Ok(EncryptedBlob { iv: nonce.to_vec(), ciphertext: buf })
}

/// Decrypts an [`EncryptedBlob`], verifying the authentication tag.
///
/// # Errors
/// Returns [`CryptoError::AuthenticationFailed`] if the key, IV, or
/// ciphertext does not match — including truncated or otherwise malformed
/// blobs. The failure modes are deliberately indistinguishable.
pub fn decrypt(key: &MasterKey, blob: &EncryptedBlob) -> Result<Vec<u8>, CryptoError> {
    if blob.iv.len() != IV_LEN || blob.ciphertext.len() < TAG_LEN {
        return Err(CryptoError::AuthenticationFailed);
    }

    let cipher = key.cipher()?;
    let nonce = blob.iv.as_slice().try_into().map_err(|_| CryptoError::AuthenticationFailed)?;

    let (ciphertext, tag_slice) = blob.ciphertext.split_at(blob.ciphertext.len() - TAG_LEN);
    let tag = tag_slice.try_into().map_err(|_| CryptoError::AuthenticationFailed)?;

    let mut buf = ciphertext.to_vec();
    cipher
        .decrypt_inout_detached(&nonce, b"", InOutBuf::from(&mut buf[..]), &tag)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(buf)
}

fn next_iv() -> Result<Nonce<Aes256Gcm>, CryptoError> {
    let mut nonce = Nonce::<Aes256Gcm>::default();
    fill(&mut nonce).map_err(|e| CryptoError::Rng { message: e.to_string() })?;
    Ok(nonce)
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
