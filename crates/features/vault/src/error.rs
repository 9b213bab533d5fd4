use packrat_crypto::CryptoError;
use packrat_storage::StoreError;

/// Custom error type for vault operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("a local vault already exists")]
    AlreadyExists,
    /// Wrong credential, missing vault, and corrupt vault all collapse into
    /// this variant so unlock failures carry no oracle.
    #[error("unlock failed")]
    UnlockFailed,
    #[error("no local vault found")]
    NotFound,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid bundle: {message}")]
    InvalidBundle { message: String },
    #[error("bundle is {actual} bytes, limit is {limit}")]
    BundleTooLarge { actual: usize, limit: usize },
}

impl VaultError {
    pub(crate) fn invalid_bundle(message: impl Into<String>) -> Self {
        Self::InvalidBundle { message: message.into() }
    }
}
