//! Live connection tracking.

use std::collections::HashSet;

use tokio::sync::RwLock;

use crate::domain::ConnectionId;

/// Set of currently connected clients.
///
/// Registered on WebSocket upgrade, unregistered on disconnect. The
/// submission flow consults [`PresenceTracker::is_connected`] after
/// every suspension point so no write lands on behalf of a connection
/// that is already gone.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    connections: RwLock<HashSet<ConnectionId>>,
}

impl PresenceTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, returning the new connected count.
    pub async fn register(&self, connection_id: ConnectionId) -> usize {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id);
        connections.len()
    }

    /// Unregisters a connection, returning the new connected count.
    pub async fn unregister(&self, connection_id: ConnectionId) -> usize {
        let mut connections = self.connections.write().await;
        connections.remove(&connection_id);
        connections.len()
    }

    /// Returns `true` while the connection is registered.
    pub async fn is_connected(&self, connection_id: ConnectionId) -> bool {
        self.connections.read().await.contains(&connection_id)
    }

    /// Returns the current connected count.
    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }
}
