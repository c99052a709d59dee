//! In-memory loopback transport.
//!
//! A [`LoopbackHub`] plays the role of the rendezvous service: every
//! [`LoopbackTransport`] connected to the same hub can join its rooms and
//! exchange payloads instantly. Used by tests and the headless simulation.

use crate::error::{NetworkError, NetworkResult};
use crate::message::PeerId;
use crate::transport::{SessionTransport, TransportEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
struct HubState {
    /// room -> members in join order
    rooms: HashMap<String, Vec<PeerId>>,
    /// peer -> room it is in
    membership: HashMap<PeerId, String>,
    /// peer -> event mailbox
    mailboxes: HashMap<PeerId, mpsc::UnboundedSender<TransportEvent>>,
}

impl HubState {
    fn notify(&self, peer: &PeerId, event: TransportEvent) {
        if let Some(mailbox) = self.mailboxes.get(peer) {
            if mailbox.send(event).is_err() {
                tracing::trace!(%peer, "loopback mailbox closed, event dropped");
            }
        }
    }

    fn leave(&mut self, peer: &PeerId) {
        let Some(room) = self.membership.remove(peer) else {
            return;
        };

        let remaining = match self.rooms.get_mut(&room) {
            Some(members) => {
                members.retain(|member| member != peer);
                members.clone()
            }
            None => Vec::new(),
        };

        if remaining.is_empty() {
            self.rooms.remove(&room);
        }

        for member in &remaining {
            self.notify(member, TransportEvent::PeerLeft(peer.clone()));
        }
        tracing::debug!(%peer, room, "peer left loopback room");
    }
}

/// Shared in-memory rendezvous for loopback transports.
#[derive(Clone, Default)]
pub struct LoopbackHub {
    state: Arc<Mutex<HubState>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a new node with a random peer id.
    pub fn connect(&self) -> LoopbackTransport {
        self.connect_as(PeerId::random())
    }

    /// Connect a node with a chosen peer id.
    pub fn connect_as(&self, id: PeerId) -> LoopbackTransport {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().mailboxes.insert(id.clone(), tx);

        LoopbackTransport {
            id,
            hub: self.clone(),
            events: Mutex::new(Some(rx)),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// Simulate an abrupt network drop of `peer`.
    ///
    /// Remaining room members get `PeerLeft`; the dropped node's event
    /// stream ends.
    pub fn disconnect(&self, peer: &PeerId) {
        let mut state = self.state.lock();
        state.leave(peer);
        state.mailboxes.remove(peer);
    }

    /// Current members of a room, in join order.
    pub fn room_members(&self, room: &str) -> Vec<PeerId> {
        self.state
            .lock()
            .rooms
            .get(room)
            .cloned()
            .unwrap_or_default()
    }

    fn join(&self, peer: &PeerId, room: &str) -> NetworkResult<Vec<PeerId>> {
        let mut state = self.state.lock();

        if !state.mailboxes.contains_key(peer) {
            return Err(NetworkError::ConnectionClosed(format!(
                "{peer} is not connected to the hub"
            )));
        }
        if let Some(current) = state.membership.get(peer) {
            return Err(NetworkError::ConnectionFailed(format!(
                "{peer} already joined room {current}"
            )));
        }

        let existing = state.rooms.get(room).cloned().unwrap_or_default();
        for member in &existing {
            state.notify(member, TransportEvent::PeerJoined(peer.clone()));
        }

        state
            .rooms
            .entry(room.to_string())
            .or_default()
            .push(peer.clone());
        state.membership.insert(peer.clone(), room.to_string());

        tracing::debug!(%peer, room, existing = existing.len(), "peer joined loopback room");
        Ok(existing)
    }

    fn deliver(&self, from: &PeerId, target: Option<&PeerId>, payload: &[u8]) -> NetworkResult<()> {
        let state = self.state.lock();

        let room = state
            .membership
            .get(from)
            .ok_or_else(|| NetworkError::ConnectionClosed(format!("{from} is not in a room")))?;
        let members = state.rooms.get(room).map(Vec::as_slice).unwrap_or_default();

        if let Some(target) = target {
            if !members.contains(target) {
                return Err(NetworkError::SendFailed(format!("{target} is not in room {room}")));
            }
        }

        for member in members
            .iter()
            .filter(|member| *member != from)
            .filter(|member| target.map_or(true, |t| t == *member))
        {
            state.notify(
                member,
                TransportEvent::Message {
                    from: from.clone(),
                    payload: payload.to_vec(),
                },
            );
        }

        Ok(())
    }

    fn close(&self, peer: &PeerId) {
        self.disconnect(peer);
    }

    fn is_member(&self, peer: &PeerId) -> bool {
        self.state.lock().membership.contains_key(peer)
    }
}

/// One node connected to a [`LoopbackHub`].
pub struct LoopbackTransport {
    id: PeerId,
    hub: LoopbackHub,
    events: Mutex<Option<mpsc::UnboundedReceiver<TransportEvent>>>,
    fail_sends: AtomicBool,
}

impl LoopbackTransport {
    /// Make every subsequent send fail (failure injection).
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::Relaxed);
    }
}

impl SessionTransport for LoopbackTransport {
    fn local_peer_id(&self) -> &PeerId {
        &self.id
    }

    fn join(
        &self,
        room: &str,
    ) -> Pin<Box<dyn Future<Output = NetworkResult<Vec<PeerId>>> + Send + '_>> {
        Box::pin(std::future::ready(self.hub.join(&self.id, room)))
    }

    fn send(&self, target: Option<&PeerId>, payload: &[u8]) -> NetworkResult<()> {
        if self.fail_sends.load(Ordering::Relaxed) {
            return Err(NetworkError::SendFailed("send failure injected".to_string()));
        }
        self.hub.deliver(&self.id, target, payload)
    }

    fn take_events(&self) -> NetworkResult<mpsc::UnboundedReceiver<TransportEvent>> {
        self.events
            .lock()
            .take()
            .ok_or_else(|| NetworkError::InvalidState("event receiver already taken".to_string()))
    }

    fn is_connected(&self) -> bool {
        self.hub.is_member(&self.id)
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = NetworkResult<()>> + Send + '_>> {
        self.hub.close(&self.id);
        Box::pin(std::future::ready(Ok(())))
    }
}
