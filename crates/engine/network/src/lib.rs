//! Peer session transport abstractions for the shared contour terrain.
//!
//! This crate provides:
//! - The cursor wire protocol (JSON `{ type, payload }` messages)
//! - The session transport trait consumed by the session bridge
//! - Session status and statistics tracking
//! - An in-memory loopback transport for tests and simulations

pub mod connection;
pub mod error;
pub mod loopback;
pub mod message;
pub mod transport;

pub use connection::{ConnectionManager, SessionInfo, SessionStatus};
pub use error::{NetworkError, NetworkResult};
pub use loopback::{LoopbackHub, LoopbackTransport};
pub use message::{decode, encode, CursorPayload, PeerId, SessionMessage};
pub use transport::{SessionTransport, TransportEvent};
