/// A specialized error enum for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key contains characters the backend cannot represent safely.
    #[error("invalid store key {key:?}: {message}")]
    InvalidKey { key: String, message: &'static str },

    /// Underlying I/O failure (file-backed store only).
    #[error("store I/O failure for {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}
