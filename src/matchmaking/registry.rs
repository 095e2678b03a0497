//! Connection → room lookup and the table of live rooms

use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::game::Room;

/// Registry of live rooms and which connection belongs to which
pub struct RoomRegistry {
    rooms: DashMap<Uuid, Arc<Room>>,
    connections: DashMap<Uuid, Arc<Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            connections: DashMap::new(),
        }
    }

    /// Register a room and both of its members
    pub fn insert(&self, room: Arc<Room>) {
        for conn_id in room.member_ids() {
            self.connections.insert(conn_id, room.clone());
        }
        self.rooms.insert(room.id(), room);
    }

    /// Room owning `conn_id`, if any
    pub fn room_for(&self, conn_id: &Uuid) -> Option<Arc<Room>> {
        self.connections.get(conn_id).map(|r| r.value().clone())
    }

    /// Drop the room and every registry entry pointing at it
    pub fn remove(&self, room: &Room) -> Option<Arc<Room>> {
        for conn_id in room.member_ids() {
            self.connections.remove(&conn_id);
        }
        self.rooms.remove(&room.id()).map(|(_, r)| r)
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn registered_connections(&self) -> usize {
        self.connections.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::ws::connection::Connection;

    #[test]
    fn insert_and_remove_track_both_members() {
        let registry = RoomRegistry::new();
        let (a, _a_rx) = Connection::channel();
        let (b, _b_rx) = Connection::channel();
        let room = Room::new(Uuid::new_v4(), a.clone(), b.clone(), Duration::from_secs(2));

        registry.insert(room.clone());
        assert_eq!(registry.active_rooms(), 1);
        assert_eq!(registry.registered_connections(), 2);
        assert_eq!(registry.room_for(&a.id()).map(|r| r.id()), Some(room.id()));
        assert_eq!(registry.room_for(&b.id()).map(|r| r.id()), Some(room.id()));

        assert!(registry.remove(&room).is_some());
        assert_eq!(registry.active_rooms(), 0);
        assert_eq!(registry.registered_connections(), 0);
        assert!(registry.room_for(&a.id()).is_none());
        assert!(registry.remove(&room).is_none());
    }
}
