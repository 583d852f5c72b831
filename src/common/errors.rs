//! Error types for the application

use thiserror::Error;

/// Result type alias using our SyncError
pub type Result<T> = std::result::Result<T, SyncError>;

/// Main error type for registry synchronization
#[derive(Error, Debug)]
pub enum SyncError {
    /// The gateway never delivered its initial valid request id
    #[error("gateway connection not ready: no valid request id within {0} seconds")]
    ConnectionNotReady(u64),

    /// WebSocket connection errors
    #[error("WebSocket connection error: {0}")]
    WebSocketConnection(String),

    /// WebSocket send/receive errors
    #[error("WebSocket communication error: {0}")]
    WebSocketCommunication(String),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Filesystem errors while reading/writing the registry
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Registry document could not be parsed
    #[error("registry parse error in {path}: {message}")]
    RegistryParse { path: String, message: String },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Channel send errors (session tasks gone)
    #[error("channel send error: {0}")]
    ChannelSend(String),

    /// Synchronization disabled via the environment kill-switch
    #[error("conId sync disabled by {0}")]
    Disabled(&'static str),
}

impl From<tokio_tungstenite::tungstenite::Error> for SyncError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        SyncError::WebSocketCommunication(err.to_string())
    }
}
