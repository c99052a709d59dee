//! Session status management.
//!
//! Tracks the session lifecycle shown to users as a status label, and the
//! message statistics of the cursor stream.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Transport being set up.
    Initializing,
    /// Room join in flight.
    Joining,
    /// In the room, exchanging positions.
    Joined,
    /// Join or connect failed; rendering continues with local state only.
    Error,
    /// Session torn down.
    Closed,
}

impl SessionStatus {
    /// Label for the status indicator.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing...",
            Self::Joining => "Joining...",
            Self::Joined => "Joined",
            Self::Error => "Error",
            Self::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of the current session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Current session status.
    pub status: SessionStatus,
    /// Room name (if joined).
    pub room: Option<String>,
    /// Time when the room was joined.
    pub joined_at: Option<Instant>,
    /// Cursor messages handed to the transport.
    pub messages_sent: u64,
    /// Valid cursor messages received.
    pub messages_received: u64,
    /// Inbound messages ignored as malformed or foreign.
    pub messages_dropped: u64,
    /// Sends the transport rejected (swallowed).
    pub send_failures: u64,
}

#[derive(Default)]
struct SessionStats {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    messages_dropped: AtomicU64,
    send_failures: AtomicU64,
}

/// Manages session status and statistics.
///
/// Cloning shares the underlying state, so a UI can hold a clone and
/// subscribe to status changes.
#[derive(Clone)]
pub struct ConnectionManager {
    status: Arc<watch::Sender<SessionStatus>>,
    status_rx: watch::Receiver<SessionStatus>,
    stats: Arc<SessionStats>,
    room: Arc<RwLock<Option<String>>>,
    joined_at: Arc<RwLock<Option<Instant>>>,
}

impl ConnectionManager {
    /// Create a new manager in the `Initializing` state.
    pub fn new() -> Self {
        let (status, status_rx) = watch::channel(SessionStatus::Initializing);
        Self {
            status: Arc::new(status),
            status_rx,
            stats: Arc::new(SessionStats::default()),
            room: Arc::new(RwLock::new(None)),
            joined_at: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the current status.
    pub fn status(&self) -> SessionStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }

    /// Get session info.
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            status: self.status(),
            room: self.room.read().clone(),
            joined_at: *self.joined_at.read(),
            messages_sent: self.stats.messages_sent.load(Ordering::Relaxed),
            messages_received: self.stats.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.stats.messages_dropped.load(Ordering::Relaxed),
            send_failures: self.stats.send_failures.load(Ordering::Relaxed),
        }
    }

    /// Transition to joining state.
    pub fn set_joining(&self, room: &str) {
        *self.room.write() = Some(room.to_string());
        self.status.send_replace(SessionStatus::Joining);
    }

    /// Transition to joined state.
    pub fn set_joined(&self) {
        *self.joined_at.write() = Some(Instant::now());
        self.status.send_replace(SessionStatus::Joined);
    }

    /// Transition to error state.
    pub fn set_error(&self) {
        *self.joined_at.write() = None;
        self.status.send_replace(SessionStatus::Error);
    }

    /// Transition to closed state.
    pub fn set_closed(&self) {
        *self.room.write() = None;
        *self.joined_at.write() = None;
        self.status.send_replace(SessionStatus::Closed);
    }

    pub fn record_sent(&self) {
        self.stats.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_received(&self) {
        self.stats.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.stats.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.stats.send_failures.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_transitions() {
        let manager = ConnectionManager::new();
        assert_eq!(manager.status(), SessionStatus::Initializing);

        manager.set_joining("demo");
        assert_eq!(manager.status(), SessionStatus::Joining);
        assert_eq!(manager.info().room.as_deref(), Some("demo"));

        manager.set_joined();
        assert_eq!(manager.status(), SessionStatus::Joined);
        assert!(manager.info().joined_at.is_some());

        manager.set_closed();
        assert_eq!(manager.status(), SessionStatus::Closed);
        assert!(manager.info().room.is_none());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(SessionStatus::Initializing.to_string(), "Initializing...");
        assert_eq!(SessionStatus::Joined.to_string(), "Joined");
        assert_eq!(SessionStatus::Error.to_string(), "Error");
    }

    #[test]
    fn test_clones_share_state() {
        let manager = ConnectionManager::new();
        let ui = manager.clone();
        let rx = ui.subscribe();

        manager.set_error();
        manager.record_sent();
        manager.record_dropped();

        assert_eq!(*rx.borrow(), SessionStatus::Error);
        let info = ui.info();
        assert_eq!(info.messages_sent, 1);
        assert_eq!(info.messages_dropped, 1);
        assert_eq!(info.send_failures, 0);
    }
}
