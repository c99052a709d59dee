//! Session transport trait.
//!
//! This module defines the contract the session bridge needs from a
//! peer-to-peer transport: room join, best-effort send, and a stream of
//! join/leave/message notifications. Implementations (WebRTC data channels,
//! relays, the in-memory loopback) can be used interchangeably.

use crate::error::NetworkResult;
use crate::message::PeerId;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// Notifications delivered by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A peer connected to us.
    PeerJoined(PeerId),
    /// A peer disconnected.
    PeerLeft(PeerId),
    /// A payload arrived from a connected peer.
    Message { from: PeerId, payload: Vec<u8> },
}

/// A peer-to-peer session transport.
///
/// `send` is synchronous and best-effort (datagram semantics): it either
/// hands the payload to the transport or fails immediately, never blocks.
pub trait SessionTransport: Send + Sync {
    /// This node's id as seen by other peers.
    fn local_peer_id(&self) -> &PeerId;

    /// Join a named room, returning the peers already connected in it.
    fn join(
        &self,
        room: &str,
    ) -> Pin<Box<dyn Future<Output = NetworkResult<Vec<PeerId>>> + Send + '_>>;

    /// Send a payload to one peer, or to every connected peer when `target`
    /// is `None`.
    fn send(&self, target: Option<&PeerId>, payload: &[u8]) -> NetworkResult<()>;

    /// Take the event receiver. Only one consumer exists; a second call
    /// fails with `InvalidState`.
    fn take_events(&self) -> NetworkResult<mpsc::UnboundedReceiver<TransportEvent>>;

    /// Check if the transport is currently in a room.
    fn is_connected(&self) -> bool;

    /// Leave the room and tear down all peer connections.
    fn close(&self) -> Pin<Box<dyn Future<Output = NetworkResult<()>> + Send + '_>>;
}
