//! Error type for cryptographic operations.

/// A specialized error enum for crypto failures.
///
/// Decryption failures are intentionally coarse: wrong key, tampered IV,
/// tampered ciphertext, and truncation all surface as
/// [`CryptoError::AuthenticationFailed`] so that no oracle for passphrase
/// correctness exists beyond decrypt success.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// AEAD tag verification failed, or the payload was too short to carry one.
    #[error("authentication failed: wrong key or corrupted data")]
    AuthenticationFailed,

    /// AEAD encryption itself failed.
    #[error("encryption failed")]
    EncryptionFailed,

    /// A fixed-size input had the wrong length.
    #[error("invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength { what: &'static str, expected: usize, actual: usize },

    /// The system CSPRNG was unavailable.
    #[error("system RNG unavailable: {message}")]
    Rng { message: String },
}
