//! Cursor state store
//!
//! One entry per known peer, plus the local peer's own entry kept apart
//! from the remotes. Network writes touch only `raw`; the smoothing engine
//! touches only `avatar` and `field`.

use crate::palette::{remote_label, LOCAL_LABEL};
use contour_network::PeerId;
use glam::Vec2;

/// Color given to peers whose color is not known yet
pub const UNKNOWN_COLOR: &str = "#FFFFFF";

/// Raw target and its two smoothed representations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPosition {
    /// Latest authoritative position
    pub raw: Vec2,
    /// Slow-smoothed copy for markers
    pub avatar: Vec2,
    /// Fast-smoothed copy for the influence field
    pub field: Vec2,
}

impl TrackedPosition {
    /// First sighting: both smoothed copies start on the target
    pub fn settled(raw: Vec2) -> Self {
        Self {
            raw,
            avatar: raw,
            field: raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CursorEntry {
    pub id: PeerId,
    pub color: String,
    pub label: String,
    /// `None` until a first position is known
    pub position: Option<TrackedPosition>,
}

impl CursorEntry {
    fn new(id: PeerId, color: String, label: String) -> Self {
        Self {
            id,
            color,
            label,
            position: None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.id.is_local()
    }

    /// Overwrite the raw target, settling smoothed copies on first sight
    fn set_raw(&mut self, raw: Vec2) {
        match &mut self.position {
            Some(position) => position.raw = raw,
            None => self.position = Some(TrackedPosition::settled(raw)),
        }
    }
}

/// Peer id → cursor entry, local peer tracked separately
#[derive(Debug, Clone)]
pub struct CursorStateStore {
    local: CursorEntry,
    /// Remote entries in insertion order, ids unique
    remotes: Vec<CursorEntry>,
}

impl CursorStateStore {
    pub fn new(local_color: impl Into<String>) -> Self {
        Self {
            local: CursorEntry::new(PeerId::local(), local_color.into(), LOCAL_LABEL.to_string()),
            remotes: Vec::new(),
        }
    }

    /// Create or overwrite an entry's raw position, color and label
    ///
    /// Smoothed positions are never written here, except to settle them on
    /// the first known position. Returns `true` if the entry was created.
    pub fn upsert(
        &mut self,
        id: &PeerId,
        raw: Vec2,
        color: Option<&str>,
        label: Option<&str>,
    ) -> bool {
        if id.is_local() {
            self.set_local(raw);
            return false;
        }

        let created = match self.index_of(id) {
            Some(_) => false,
            None => {
                self.insert_remote(id, color);
                true
            }
        };

        if let Some(entry) = self.remotes.iter_mut().find(|entry| &entry.id == id) {
            entry.set_raw(raw);
            if let Some(color) = color {
                entry.color = color.to_string();
            }
            if let Some(label) = label {
                entry.label = label.to_string();
            }
        }

        created
    }

    /// Track a peer whose position is not known yet
    ///
    /// Returns `false` if the peer is already tracked.
    pub fn register(&mut self, id: &PeerId, color: Option<&str>) -> bool {
        if id.is_local() || self.index_of(id).is_some() {
            return false;
        }
        self.insert_remote(id, color);
        true
    }

    /// Drop a peer; unknown ids and the local entry are ignored
    pub fn remove(&mut self, id: &PeerId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.remotes.remove(index);
                true
            }
            None => false,
        }
    }

    /// Entries in render order: local first, then remotes in insertion order
    pub fn snapshot(&self) -> Vec<&CursorEntry> {
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CursorEntry> {
        std::iter::once(&self.local).chain(self.remotes.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CursorEntry> {
        std::iter::once(&mut self.local).chain(self.remotes.iter_mut())
    }

    pub fn set_local(&mut self, raw: Vec2) {
        self.local.set_raw(raw);
    }

    pub fn local(&self) -> &CursorEntry {
        &self.local
    }

    pub fn get(&self, id: &PeerId) -> Option<&CursorEntry> {
        if id.is_local() {
            return Some(&self.local);
        }
        self.remotes.iter().find(|entry| &entry.id == id)
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.get(id).is_some()
    }

    /// Number of entries, local included
    pub fn len(&self) -> usize {
        self.remotes.len() + 1
    }

    pub fn remote_count(&self) -> usize {
        self.remotes.len()
    }

    /// Fast-smoothed positions of entries with a known position, in render order
    pub fn influence_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.iter()
            .filter_map(|entry| entry.position.map(|position| position.field))
    }

    fn index_of(&self, id: &PeerId) -> Option<usize> {
        self.remotes.iter().position(|entry| &entry.id == id)
    }

    fn insert_remote(&mut self, id: &PeerId, color: Option<&str>) {
        tracing::debug!(peer = %id, "tracking cursor");
        self.remotes.push(CursorEntry::new(
            id.clone(),
            color.unwrap_or(UNKNOWN_COLOR).to_string(),
            remote_label(id),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_then_snapshot_has_one_entry() {
        let mut store = CursorStateStore::new("#FF5733");
        let peer = PeerId::new("abcdef01");

        assert!(store.upsert(&peer, Vec2::new(0.1, 0.2), Some("#33FF57"), None));
        assert!(!store.upsert(&peer, Vec2::new(0.3, 0.4), None, None));

        let matching: Vec<_> = store.snapshot().into_iter().filter(|e| e.id == peer).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].label, "abcd");
        assert_eq!(matching[0].color, "#33FF57");
        assert_eq!(matching[0].position.map(|p| p.raw), Some(Vec2::new(0.3, 0.4)));
    }

    #[test]
    fn test_upsert_never_moves_smoothed_after_first_sight() {
        let mut store = CursorStateStore::new("#FF5733");
        let peer = PeerId::new("p1");

        store.upsert(&peer, Vec2::new(0.5, 0.5), None, None);
        store.upsert(&peer, Vec2::new(0.9, 0.1), None, None);

        let position = store.get(&peer).and_then(|e| e.position).unwrap();
        assert_eq!(position.raw, Vec2::new(0.9, 0.1));
        assert_eq!(position.avatar, Vec2::new(0.5, 0.5));
        assert_eq!(position.field, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_remove_and_unknown_remove() {
        let mut store = CursorStateStore::new("#FF5733");
        let peer = PeerId::new("p1");
        store.upsert(&peer, Vec2::ZERO, None, None);

        assert!(store.remove(&peer));
        assert!(store.snapshot().iter().all(|e| e.id != peer));
        assert!(!store.remove(&peer));
        assert!(!store.remove(&PeerId::new("never-seen")));
        // Local entry persists
        assert!(!store.remove(&PeerId::local()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_register_is_duplicate_guarded() {
        let mut store = CursorStateStore::new("#FF5733");
        let peer = PeerId::new("p1");

        assert!(store.register(&peer, None));
        assert!(!store.register(&peer, Some("#3357FF")));
        assert_eq!(store.remote_count(), 1);
        assert_eq!(store.get(&peer).map(|e| e.color.as_str()), Some(UNKNOWN_COLOR));
        assert!(store.get(&peer).and_then(|e| e.position).is_none());
        assert_eq!(store.influence_points().count(), 0);
    }

    #[test]
    fn test_snapshot_order_is_stable() {
        let mut store = CursorStateStore::new("#FF5733");
        for id in ["c", "a", "b"] {
            store.upsert(&PeerId::new(id), Vec2::splat(0.5), None, None);
        }
        store.set_local(Vec2::splat(0.1));

        let order = |store: &CursorStateStore| -> Vec<String> {
            store.snapshot().iter().map(|e| e.id.to_string()).collect()
        };
        assert_eq!(order(&store), vec!["local", "c", "a", "b"]);
        assert_eq!(order(&store), order(&store));
        assert_eq!(store.local().label, "You");
    }

    #[test]
    fn test_local_upsert_routes_to_local_entry() {
        let mut store = CursorStateStore::new("#FF5733");
        assert!(store.local().position.is_none());

        assert!(!store.upsert(&PeerId::local(), Vec2::new(0.4, 0.6), None, None));
        assert_eq!(store.remote_count(), 0);
        assert_eq!(
            store.local().position,
            Some(TrackedPosition::settled(Vec2::new(0.4, 0.6)))
        );
    }
}
