//! Live room membership tracking.
//!
//! A room is the pair of connections produced by a successful match.
//! Rooms exist only in process memory: they are registered the moment
//! both interest records are marked matched and dropped when either
//! member disconnects. No close event is persisted.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{ConnectionId, RoomId};

/// A two-party signaling room.
#[derive(Debug, Clone)]
pub struct Room {
    /// Room identifier shared with both clients.
    pub room_id: RoomId,
    /// The two member connections.
    pub members: [ConnectionId; 2],
    /// The member that sends the first signaling offer.
    pub initiator: ConnectionId,
    /// Creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Room {
    /// Creates a room pairing `initiator` with `peer`. The initiator is
    /// the side that sends the first offer.
    #[must_use]
    pub fn new(room_id: RoomId, initiator: ConnectionId, peer: ConnectionId) -> Self {
        Self {
            room_id,
            members: [initiator, peer],
            initiator,
            created_at: chrono::Utc::now(),
        }
    }

    /// Returns `true` if the connection is one of the two members.
    #[must_use]
    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        let [a, b] = self.members;
        a == connection_id || b == connection_id
    }

    /// Returns the other member for a given member, or `None` if the
    /// given connection is not in the room.
    #[must_use]
    pub fn peer_of(&self, connection_id: ConnectionId) -> Option<ConnectionId> {
        let [a, b] = self.members;
        if connection_id == a {
            Some(b)
        } else if connection_id == b {
            Some(a)
        } else {
            None
        }
    }

    /// Returns whether the given member initiates signaling.
    #[must_use]
    pub fn is_initiator(&self, connection_id: ConnectionId) -> bool {
        self.initiator == connection_id
    }
}

/// Registry of all open rooms, keyed by room id.
///
/// Membership is registered before match notifications are published,
/// so a notified client can never signal into an incomplete room.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, Room>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a room. Room ids are collision-resistant, so an insert
    /// never replaces an existing room in practice.
    pub async fn insert(&self, room: Room) {
        let mut rooms = self.rooms.write().await;
        rooms.insert(room.room_id.clone(), room);
    }

    /// Looks up a room by id.
    pub async fn get(&self, room_id: &RoomId) -> Option<Room> {
        self.rooms.read().await.get(room_id).cloned()
    }

    /// Resolves the other member of `room_id` for `sender`.
    ///
    /// Returns `None` when the room does not exist or the sender is not
    /// a member, so a relay can never reach a connection outside the
    /// room.
    pub async fn peer_of(&self, room_id: &RoomId, sender: ConnectionId) -> Option<ConnectionId> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).and_then(|room| room.peer_of(sender))
    }

    /// Drops every room the connection belongs to, returning the
    /// removed rooms.
    pub async fn remove_by_connection(&self, connection_id: ConnectionId) -> Vec<Room> {
        let mut rooms = self.rooms.write().await;
        let doomed: Vec<RoomId> = rooms
            .values()
            .filter(|room| room.contains(connection_id))
            .map(|room| room.room_id.clone())
            .collect();
        doomed
            .into_iter()
            .filter_map(|room_id| rooms.remove(&room_id))
            .collect()
    }

    /// Returns the number of open rooms.
    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Returns `true` if no rooms are open.
    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn peer_of_resolves_both_directions() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let room = Room::new(RoomId::generate(), a, b);
        assert_eq!(room.peer_of(a), Some(b));
        assert_eq!(room.peer_of(b), Some(a));
        assert_eq!(room.peer_of(ConnectionId::new()), None);
    }

    #[test]
    fn exactly_one_member_initiates() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let room = Room::new(RoomId::generate(), a, b);
        assert!(room.is_initiator(a));
        assert!(!room.is_initiator(b));
    }

    #[tokio::test]
    async fn registry_peer_of_rejects_non_members() {
        let registry = RoomRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let room = Room::new(RoomId::generate(), a, b);
        let room_id = room.room_id.clone();
        registry.insert(room).await;

        assert_eq!(registry.peer_of(&room_id, a).await, Some(b));
        assert_eq!(registry.peer_of(&room_id, ConnectionId::new()).await, None);
        assert_eq!(registry.peer_of(&RoomId::generate(), a).await, None);
    }

    #[tokio::test]
    async fn remove_by_connection_drops_only_that_connections_rooms() {
        let registry = RoomRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let c = ConnectionId::new();
        let d = ConnectionId::new();
        registry.insert(Room::new(RoomId::generate(), a, b)).await;
        registry.insert(Room::new(RoomId::generate(), c, d)).await;

        let removed = registry.remove_by_connection(a).await;
        assert_eq!(removed.len(), 1);
        assert_eq!(registry.len().await, 1);

        // The surviving room is untouched.
        let survivors = registry.remove_by_connection(c).await;
        assert_eq!(survivors.len(), 1);
        assert!(registry.is_empty().await);
    }
}
