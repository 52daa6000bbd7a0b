use thiserror::Error;

/// Top-level error type for Corredor.
#[derive(Debug, Error)]
pub enum CorredorError {
    /// Error from the text-completion provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Error from the sheet store.
    #[error("sheets error: {0}")]
    Sheets(String),

    /// Local database error.
    #[error("memory error: {0}")]
    Memory(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
