//! Network message types.
//!
//! Messages are JSON objects of the form
//! `{ "type": "cursor", "payload": { "x": .., "z": .., "color": .. } }`.
//! They are transport-agnostic; the sender's peer id is normally implied by
//! the transport connection the message arrived on.

use crate::error::{NetworkError, NetworkResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted color string (`#RRGGBB` plus slack for named colors).
const MAX_COLOR_LEN: usize = 32;

/// Stable peer identifier, unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Sentinel id used for the local peer's own cursor entry.
    pub const LOCAL: &'static str = "local";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The local peer sentinel.
    pub fn local() -> Self {
        Self(Self::LOCAL.to_string())
    }

    /// Random 16-hex-digit id for a freshly connected node.
    pub fn random() -> Self {
        Self(format!("{:016x}", rand::random::<u64>()))
    }

    pub fn is_local(&self) -> bool {
        self.0 == Self::LOCAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First four characters, used as a display label.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(4) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Messages exchanged between peers in a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum SessionMessage {
    /// Pointer position update.
    Cursor(CursorPayload),
}

/// Cursor position in surface (or screen-fraction) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPayload {
    pub x: f32,
    /// Second surface axis; screen-mode senders call it `y`.
    #[serde(alias = "y")]
    pub z: f32,
    pub color: String,
    /// Optional explicit sender id; the transport connection is authoritative.
    #[serde(rename = "peerId", default, skip_serializing_if = "Option::is_none")]
    pub peer_id: Option<PeerId>,
}

impl CursorPayload {
    pub fn new(x: f32, z: f32, color: impl Into<String>) -> Self {
        Self {
            x,
            z,
            color: color.into(),
            peer_id: None,
        }
    }

    /// Reject values that must never reach the store or the shader.
    pub fn validate(&self) -> NetworkResult<()> {
        if !self.x.is_finite() || !self.z.is_finite() {
            return Err(NetworkError::InvalidPayload(format!(
                "non-finite coordinate ({}, {})",
                self.x, self.z
            )));
        }
        if self.color.is_empty() || self.color.len() > MAX_COLOR_LEN {
            return Err(NetworkError::InvalidPayload(format!(
                "color must be 1..={MAX_COLOR_LEN} bytes"
            )));
        }
        Ok(())
    }
}

/// Serialize a message to JSON bytes.
pub fn encode(message: &SessionMessage) -> NetworkResult<Vec<u8>> {
    serde_json::to_vec(message).map_err(|e| NetworkError::Serialization(e.to_string()))
}

/// Deserialize and validate JSON bytes.
///
/// Distinguishes a foreign-but-well-formed message (`UnknownMessageType`)
/// from a malformed one (`Deserialization`/`InvalidPayload`) so callers can
/// log them differently; both are meant to be ignored.
pub fn decode(bytes: &[u8]) -> NetworkResult<SessionMessage> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| NetworkError::Deserialization(e.to_string()))?;

    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| NetworkError::Deserialization("missing message type".to_string()))?;

    if kind != "cursor" {
        return Err(NetworkError::UnknownMessageType(kind.to_string()));
    }

    let message: SessionMessage =
        serde_json::from_value(value).map_err(|e| NetworkError::Deserialization(e.to_string()))?;

    match &message {
        SessionMessage::Cursor(payload) => payload.validate()?,
    }

    Ok(message)
}
