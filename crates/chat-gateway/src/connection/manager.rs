//! Connection manager
//!
//! Registry of live connections plus the room membership index. Rooms live
//! only here: they are never persisted and vanish with their last member.

use super::{Connection, ConnectionId, Identity};
use crate::protocol::GatewayMessage;
use chat_core::{Namespace, RoomKey};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Manages all active WebSocket connections of this instance
///
/// Uses `DashMap` so joins, leaves, disconnects and deliveries can interleave
/// from any task.
pub struct ConnectionManager {
    /// Active connections by id
    connections: DashMap<ConnectionId, Arc<Connection>>,

    /// Connection id to the rooms it joined
    memberships: DashMap<ConnectionId, HashSet<RoomKey>>,

    /// Room to member connection ids
    rooms: DashMap<RoomKey, HashSet<ConnectionId>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            memberships: DashMap::new(),
            rooms: DashMap::new(),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register an authenticated connection
    pub fn register(
        &self,
        namespace: Namespace,
        identity: Identity,
        sender: mpsc::Sender<GatewayMessage>,
    ) -> Arc<Connection> {
        let connection = Connection::new(namespace, identity, sender);
        self.memberships.insert(connection.id(), HashSet::new());
        self.connections.insert(connection.id(), connection.clone());

        tracing::debug!(conn_id = %connection.id(), namespace = %namespace, "Connection registered");

        connection
    }

    /// Remove a connection and every room membership it holds
    pub fn remove(&self, conn_id: ConnectionId) {
        // Memberships go first so a concurrent join cannot re-add the connection
        let rooms = self.memberships.remove(&conn_id).map(|(_, rooms)| rooms);
        self.connections.remove(&conn_id);

        for room in rooms.iter().flatten() {
            self.detach(conn_id, room);
        }

        tracing::debug!(conn_id = %conn_id, "Connection removed");
    }

    pub fn get(&self, conn_id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.get(&conn_id).map(|r| r.clone())
    }

    /// Add a connection to a room; false if the connection is gone
    pub fn join(&self, conn_id: ConnectionId, room: RoomKey) -> bool {
        let Some(mut joined) = self.memberships.get_mut(&conn_id) else {
            return false;
        };

        // The membership entry stays locked until the room index is updated
        joined.insert(room.clone());
        self.rooms.entry(room.clone()).or_default().insert(conn_id);

        tracing::trace!(conn_id = %conn_id, room = %room, "Joined room");
        true
    }

    /// Remove a connection from a room; false if it was not a member
    pub fn leave(&self, conn_id: ConnectionId, room: &RoomKey) -> bool {
        let removed = self
            .memberships
            .get_mut(&conn_id)
            .is_some_and(|mut joined| joined.remove(room));

        if removed {
            self.detach(conn_id, room);
            tracing::trace!(conn_id = %conn_id, room = %room, "Left room");
        }

        removed
    }

    fn detach(&self, conn_id: ConnectionId, room: &RoomKey) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(&conn_id);
        }
        self.rooms.remove_if(room, |_, members| members.is_empty());
    }

    pub fn is_member(&self, conn_id: ConnectionId, room: &RoomKey) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(&conn_id))
    }

    /// Snapshot of a room's live members
    pub fn members(&self, room: &RoomKey) -> Vec<Arc<Connection>> {
        self.rooms
            .get(room)
            .map(|members| {
                members
                    .iter()
                    .filter_map(|id| self.connections.get(id).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Queue a message for every local member of a room.
    ///
    /// A member whose queue is full or closed misses the message; the rest
    /// still get it. Returns the number of queues that accepted it.
    pub fn deliver(&self, room: &RoomKey, message: &GatewayMessage) -> usize {
        let mut sent = 0;

        for conn in self.members(room) {
            match conn.try_send(message.clone()) {
                Ok(()) => sent += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        conn_id = %conn.id(),
                        room = %room,
                        event = %message.event,
                        "Outbound queue full, event dropped for connection"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::trace!(conn_id = %conn.id(), "Connection closing, skipped");
                }
            }
        }

        sent
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Rooms a connection currently belongs to
    pub fn rooms_of(&self, conn_id: ConnectionId) -> Vec<RoomKey> {
        self.memberships
            .get(&conn_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("rooms", &self.rooms.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::Snowflake;
    use serde_json::Value;

    fn user(manager: &ConnectionManager, capacity: usize) -> (Arc<Connection>, mpsc::Receiver<GatewayMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn = manager.register(Namespace::Messages, Identity::User(Snowflake::new(1)), tx);
        (conn, rx)
    }

    fn room(n: i64) -> RoomKey {
        RoomKey::conversation(Snowflake::new(n))
    }

    #[test]
    fn test_manager_creation() {
        let manager = ConnectionManager::new();
        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.room_count(), 0);
    }

    #[test]
    fn test_join_and_leave() {
        let manager = ConnectionManager::new();
        let (conn, _rx) = user(&manager, 10);

        assert!(manager.join(conn.id(), room(1)));
        assert!(manager.is_member(conn.id(), &room(1)));
        assert_eq!(manager.members(&room(1)).len(), 1);

        assert!(manager.leave(conn.id(), &room(1)));
        assert!(!manager.is_member(conn.id(), &room(1)));
        assert_eq!(manager.room_count(), 0, "empty rooms are dropped");

        assert!(!manager.leave(conn.id(), &room(1)));
    }

    #[test]
    fn test_many_rooms_per_connection() {
        let manager = ConnectionManager::new();
        let (conn, _rx) = user(&manager, 10);

        manager.join(conn.id(), room(1));
        manager.join(conn.id(), room(2));
        manager.join(conn.id(), RoomKey::app(Namespace::Interactions, Snowflake::new(9)));

        assert_eq!(manager.rooms_of(conn.id()).len(), 3);
    }

    #[test]
    fn test_remove_clears_memberships() {
        let manager = ConnectionManager::new();
        let (a, _rx_a) = user(&manager, 10);
        let (b, _rx_b) = user(&manager, 10);

        manager.join(a.id(), room(1));
        manager.join(a.id(), room(2));
        manager.join(b.id(), room(1));

        manager.remove(a.id());

        assert!(manager.get(a.id()).is_none());
        assert_eq!(manager.members(&room(1)).len(), 1);
        assert!(manager.members(&room(2)).is_empty());
        assert_eq!(manager.room_count(), 1);
    }

    #[test]
    fn test_join_after_remove_is_refused() {
        let manager = ConnectionManager::new();
        let (conn, _rx) = user(&manager, 10);
        manager.remove(conn.id());

        assert!(!manager.join(conn.id(), room(1)));
        assert_eq!(manager.room_count(), 0);
    }

    #[tokio::test]
    async fn test_deliver_reaches_members_only() {
        let manager = ConnectionManager::new();
        let (a, mut rx_a) = user(&manager, 10);
        let (_b, mut rx_b) = user(&manager, 10);
        manager.join(a.id(), room(1));

        let sent = manager.deliver(&room(1), &GatewayMessage::new("newMessage", Value::Null));

        assert_eq!(sent, 1);
        assert_eq!(rx_a.recv().await.unwrap().event, "newMessage");
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_full_queue_does_not_block_others() {
        let manager = ConnectionManager::new();
        let (slow, _rx_slow) = user(&manager, 1);
        let (fast, _rx_fast) = user(&manager, 10);
        manager.join(slow.id(), room(1));
        manager.join(fast.id(), room(1));

        let message = GatewayMessage::new("newMessage", Value::Null);
        assert_eq!(manager.deliver(&room(1), &message), 2);
        assert_eq!(manager.deliver(&room(1), &message), 1);
    }
}
