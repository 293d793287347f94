//! Error types for the chat relay
//!
//! Uses thiserror for ergonomic error definitions.
//!
//! Application-level failures (unknown message id, sender never joined)
//! are deliberately not represented here: the protocol handles them as
//! silent no-ops, so only transport-level failures carry a type. Fan-out
//! to a departed peer is likewise best effort and simply ignored.

use thiserror::Error;

/// Application-level errors
///
/// All variants are transport-level and fatal to the connection that
/// produced them; none of them terminates the server itself.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,
}
