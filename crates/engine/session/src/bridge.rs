//! Session bridge between the cursor store and a peer transport
//!
//! Outbound: the local position is encoded and broadcast best-effort.
//! Inbound: transport events are buffered by the transport and drained
//! synchronously by [`SessionBridge::pump`], so every message received
//! before a frame's smoothing step is applied to the store before it.

use crate::palette::remote_label;
use crate::store::CursorStateStore;
use contour_network::{
    decode, encode, ConnectionManager, CursorPayload, NetworkError, NetworkResult, PeerId,
    SessionInfo, SessionMessage, SessionStatus, SessionTransport, TransportEvent,
};
use glam::Vec2;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::sync::watch;

/// Store change applied during a pump
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    RemoteUpdate { peer: PeerId, position: Vec2 },
    PeerJoined(PeerId),
    PeerLeft(PeerId),
}

pub struct SessionBridge<T: SessionTransport> {
    transport: T,
    /// `None` once closed; no event is processed after that
    events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    connection: ConnectionManager,
    color: String,
    /// Connected peers in connection order
    peers: Vec<PeerId>,
    last_sent: Option<Vec2>,
}

impl<T: SessionTransport> SessionBridge<T> {
    pub fn new(transport: T, color: impl Into<String>) -> NetworkResult<Self> {
        let events = transport.take_events()?;
        Ok(Self {
            transport,
            events: Some(events),
            connection: ConnectionManager::new(),
            color: color.into(),
            peers: Vec::new(),
            last_sent: None,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn local_peer_id(&self) -> &PeerId {
        self.transport.local_peer_id()
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Join `room` and register every peer already in it
    ///
    /// On failure the status becomes `Error`; the caller keeps rendering
    /// with local state only.
    pub async fn join(
        &mut self,
        room: &str,
        store: &mut CursorStateStore,
    ) -> NetworkResult<Vec<PeerId>> {
        if self.events.is_none() {
            return Err(NetworkError::InvalidState("session is closed".to_string()));
        }

        self.connection.set_joining(room);
        match self.transport.join(room).await {
            Ok(existing) => {
                for peer in &existing {
                    self.track_peer(peer, store);
                }
                self.connection.set_joined();
                tracing::info!(
                    room,
                    peer = %self.transport.local_peer_id(),
                    existing = existing.len(),
                    "joined room"
                );
                Ok(existing)
            }
            Err(e) => {
                self.connection.set_error();
                tracing::warn!(room, "failed to join room: {e}");
                Err(e)
            }
        }
    }

    /// Broadcast the local position to every connected peer
    ///
    /// Failures are logged and counted, never returned: the next update
    /// supersedes a lost one. Returns whether the payload was handed off.
    pub fn send_local_position(&mut self, surface: Vec2) -> bool {
        if self.connection.status() != SessionStatus::Joined {
            return false;
        }
        self.last_sent = Some(surface);
        self.send_position(None, surface)
    }

    /// Drain pending transport events into the store
    pub fn pump(&mut self, store: &mut CursorStateStore) -> Vec<BridgeEvent> {
        let mut applied = Vec::new();

        loop {
            let Some(events) = self.events.as_mut() else {
                break;
            };
            match events.try_recv() {
                Ok(event) => self.apply(event, store, &mut applied),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.events = None;
                    if self.connection.status() == SessionStatus::Joined {
                        self.connection.set_error();
                        tracing::warn!("transport event stream ended");
                    }
                    break;
                }
            }
        }

        applied
    }

    /// Connected peers plus the local one
    pub fn active_peer_count(&self) -> usize {
        self.peers.len() + 1
    }

    pub fn peers(&self) -> &[PeerId] {
        &self.peers
    }

    pub fn status(&self) -> SessionStatus {
        self.connection.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.connection.subscribe()
    }

    pub fn info(&self) -> SessionInfo {
        self.connection.info()
    }

    /// Detach from the transport and drop all remote entries
    ///
    /// Pending events are discarded; later pumps are no-ops.
    pub async fn close(&mut self, store: &mut CursorStateStore) -> NetworkResult<()> {
        self.events = None;
        for peer in self.peers.drain(..) {
            store.remove(&peer);
        }

        let result = self.transport.close().await;
        self.connection.set_closed();
        match &result {
            Ok(()) => tracing::info!("session closed"),
            Err(e) => tracing::warn!("error while closing transport: {e}"),
        }
        result
    }

    fn apply(
        &mut self,
        event: TransportEvent,
        store: &mut CursorStateStore,
        applied: &mut Vec<BridgeEvent>,
    ) {
        let peer = match &event {
            TransportEvent::PeerJoined(peer) | TransportEvent::PeerLeft(peer) => peer,
            TransportEvent::Message { from, .. } => from,
        };
        if peer.is_local() {
            // Reserved for this peer's own store entry
            if matches!(event, TransportEvent::Message { .. }) {
                self.connection.record_dropped();
            }
            tracing::warn!(%peer, "ignoring event from a peer using the reserved local id");
            return;
        }

        match event {
            TransportEvent::PeerJoined(peer) => {
                if self.track_peer(&peer, store) {
                    // Newcomer would otherwise not see us until we move
                    if let Some(surface) = self.last_sent {
                        self.send_position(Some(&peer), surface);
                    }
                    applied.push(BridgeEvent::PeerJoined(peer));
                }
            }
            TransportEvent::PeerLeft(peer) => {
                self.peers.retain(|p| p != &peer);
                store.remove(&peer);
                tracing::info!(%peer, "peer left");
                applied.push(BridgeEvent::PeerLeft(peer));
            }
            TransportEvent::Message { from, payload } => match decode(&payload) {
                Ok(SessionMessage::Cursor(cursor)) => {
                    self.connection.record_received();
                    if let Some(claimed) = cursor.peer_id.as_ref().filter(|id| **id != from) {
                        tracing::trace!(%from, %claimed, "payload peer id differs from sender");
                    }
                    self.track_peer(&from, store);

                    let position = Vec2::new(cursor.x, cursor.z).clamp(Vec2::ZERO, Vec2::ONE);
                    store.upsert(&from, position, Some(cursor.color.as_str()), None);
                    tracing::trace!(%from, ?position, "remote cursor update");
                    applied.push(BridgeEvent::RemoteUpdate {
                        peer: from,
                        position,
                    });
                }
                Err(NetworkError::UnknownMessageType(kind)) => {
                    self.connection.record_dropped();
                    tracing::trace!(%from, %kind, "ignoring foreign message type");
                }
                Err(e) => {
                    self.connection.record_dropped();
                    tracing::debug!(%from, "ignoring malformed message: {e}");
                }
            },
        }
    }

    /// Remember a connected peer; `false` if it was already known
    fn track_peer(&mut self, peer: &PeerId, store: &mut CursorStateStore) -> bool {
        if peer.is_local() || peer == self.transport.local_peer_id() || self.peers.contains(peer) {
            return false;
        }
        self.peers.push(peer.clone());
        store.register(peer, None);
        tracing::info!(%peer, label = %remote_label(peer), "peer connected");
        true
    }

    fn send_position(&self, target: Option<&PeerId>, surface: Vec2) -> bool {
        let mut payload = CursorPayload::new(surface.x, surface.y, self.color.clone());
        payload.peer_id = Some(self.transport.local_peer_id().clone());

        let sent = encode(&SessionMessage::Cursor(payload))
            .and_then(|bytes| self.transport.send(target, &bytes));

        match sent {
            Ok(()) => {
                self.connection.record_sent();
                true
            }
            Err(e) => {
                self.connection.record_send_failure();
                tracing::warn!("dropping cursor update: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_network::LoopbackHub;

    #[tokio::test]
    async fn test_send_before_join_is_skipped() {
        let hub = LoopbackHub::new();
        let mut bridge = SessionBridge::new(hub.connect(), "#FF5733").unwrap();

        assert_eq!(bridge.status(), SessionStatus::Initializing);
        assert!(!bridge.send_local_position(Vec2::splat(0.5)));
        assert_eq!(bridge.info().messages_sent, 0);
        assert_eq!(bridge.active_peer_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_join_notification_is_ignored() {
        let hub = LoopbackHub::new();
        let b_transport = hub.connect_as(PeerId::new("bbbb"));
        let mut a = SessionBridge::new(hub.connect_as(PeerId::new("aaaa")), "#FF5733").unwrap();
        let mut store = CursorStateStore::new("#FF5733");

        b_transport.join("demo").await.unwrap();
        a.join("demo", &mut store).await.unwrap();
        assert_eq!(a.active_peer_count(), 2);

        // The join list already included bbbb; a late join notice changes nothing
        a.apply(
            TransportEvent::PeerJoined(PeerId::new("bbbb")),
            &mut store,
            &mut Vec::new(),
        );
        assert_eq!(a.peers(), &[PeerId::new("bbbb")]);
        assert_eq!(store.remote_count(), 1);
    }

    #[tokio::test]
    async fn test_close_detaches_events() {
        let hub = LoopbackHub::new();
        let mut a = SessionBridge::new(hub.connect_as(PeerId::new("aaaa")), "#FF5733").unwrap();
        let mut b = SessionBridge::new(hub.connect_as(PeerId::new("bbbb")), "#33FF57").unwrap();
        let mut store_a = CursorStateStore::new("#FF5733");
        let mut store_b = CursorStateStore::new("#33FF57");

        a.join("demo", &mut store_a).await.unwrap();
        b.join("demo", &mut store_b).await.unwrap();
        a.pump(&mut store_a);
        b.send_local_position(Vec2::new(0.4, 0.4));

        a.close(&mut store_a).await.unwrap();
        assert_eq!(a.status(), SessionStatus::Closed);
        assert!(a.pump(&mut store_a).is_empty());
        assert_eq!(store_a.remote_count(), 0);
        assert!(a.join("demo", &mut store_a).await.is_err());
    }
}
