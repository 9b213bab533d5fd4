/// Custom error type for sync operations, decoupled from any HTTP library.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote object changed since the version named in `If-Match`.
    #[error("remote version conflict")]
    Conflict,
    #[error("request timed out")]
    Timeout,
    #[error("network error: {message}")]
    Network { message: String },
    #[error("server returned status {status}")]
    Http { status: u16 },
    #[error("could not decode server response: {message}")]
    Decode { message: String },
}

impl SyncError {
    /// One-line message suitable for showing to the user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Conflict => "Your vault changed somewhere else. Reload and try again.",
            Self::Http { status: 401 | 403 } => "Your session expired. Please sign in again.",
            Self::Http { status: 500..=u16::MAX } => {
                "The server is having trouble. Try again in a little while."
            },
            Self::Timeout | Self::Network { .. } => {
                "Could not reach the server. Check your connection and try again."
            },
            Self::Http { .. } | Self::Decode { .. } => "Something went wrong while syncing.",
        }
    }
}
