use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors that can occur when using the shop realtime client.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token store could not be read
    #[error("Token store error: {0}")]
    TokenStore(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error (malformed page origin or backend host)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Filesystem error (file-backed token store)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, RealtimeError>`.
pub type Result<T> = std::result::Result<T, RealtimeError>;
