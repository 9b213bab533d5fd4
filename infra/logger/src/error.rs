/// A specialized error enum for logger initialization failures.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// The builder settings are contradictory or incomplete.
    #[error("invalid logger configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The rolling file appender could not be created.
    #[error("file appender setup failed: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    /// A global subscriber was already installed.
    #[error("subscriber installation failed: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}
