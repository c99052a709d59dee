//! Network error types.

use thiserror::Error;

/// Network-specific errors.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Connection or room join failed to establish.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Failed to send a message.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Well-formed message of a type this protocol does not handle.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// Message parsed but carries values outside the accepted range.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Invalid state for operation.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Convenience result type for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
