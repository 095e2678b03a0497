//! Session manager - pairs connections into rooms and routes their messages

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::game::Room;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::connection::Connection;
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::queue::MatchmakingQueue;
use super::registry::RoomRegistry;

/// Tunables the session manager needs from the config
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Live rooms allowed at once
    pub max_rooms: usize,
    /// Delay before an emptied magazine is refilled
    pub reload_delay: Duration,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_rooms: config.max_rooms,
            reload_delay: config.reload_delay,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_rooms: 32,
            reload_delay: Duration::from_millis(2000),
        }
    }
}

/// What happened to a freshly accepted connection
#[derive(Clone)]
pub enum ConnectOutcome {
    /// Parked in the queue until someone else shows up
    Waiting,
    /// Paired with the waiting connection
    Matched(Arc<Room>),
    /// At capacity. The client was sent `full` and should be closed.
    Rejected,
}

/// Owns the matchmaking queue and the room registry
pub struct SessionManager {
    /// Lock order: queue first, then any room lock.
    queue: Mutex<MatchmakingQueue>,
    registry: RoomRegistry,
    settings: SessionSettings,
}

impl SessionManager {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            queue: Mutex::new(MatchmakingQueue::new()),
            registry: RoomRegistry::new(),
            settings,
        }
    }

    /// A client connected
    pub fn on_connect(&self, conn: Connection) -> ConnectOutcome {
        let mut queue = self.queue.lock();

        if queue.is_empty() && self.registry.active_rooms() >= self.settings.max_rooms {
            warn!(
                conn_id = %conn.id(),
                active_rooms = self.registry.active_rooms(),
                "Server full, rejecting connection"
            );
            conn.send(ServerMsg::Full);
            return ConnectOutcome::Rejected;
        }

        match queue.offer(conn.clone()) {
            None => {
                info!(conn_id = %conn.id(), "Player waiting for opponent");
                conn.send(ServerMsg::Waiting);
                ConnectOutcome::Waiting
            }
            Some(waiting) => {
                let waited = waiting.wait_time();
                let room = Room::new(
                    Uuid::new_v4(),
                    waiting.conn,
                    conn,
                    self.settings.reload_delay,
                );
                self.registry.insert(room.clone());
                room.announce();

                info!(
                    room_id = %room.id(),
                    waited_ms = waited.as_millis() as u64,
                    active_rooms = self.registry.active_rooms(),
                    "Created new room"
                );
                ConnectOutcome::Matched(room)
            }
        }
    }

    /// A text frame arrived from `conn_id`.
    ///
    /// `limits` only throttles `move` / `aim`; shots, hits and ready signals
    /// always reach the room.
    pub fn on_message(&self, conn_id: Uuid, payload: &str, limits: &ConnectionRateLimiter) {
        let msg = match serde_json::from_str::<ClientMsg>(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "Failed to parse client message");
                return;
            }
        };

        if !limits.admit(&msg) {
            debug!(conn_id = %conn_id, "Rate limited continuous input");
            return;
        }

        let Some(room) = self.registry.room_for(&conn_id) else {
            debug!(conn_id = %conn_id, "Message from connection without a room, dropping");
            return;
        };

        let Some(role) = room.role_of(conn_id) else {
            warn!(conn_id = %conn_id, room_id = %room.id(), "Sender is not a member of its room");
            return;
        };

        room.handle_input(role, msg);
    }

    /// `conn_id` went away
    pub fn on_close(&self, conn_id: Uuid) {
        let mut queue = self.queue.lock();

        if queue.withdraw(conn_id).is_some() {
            info!(conn_id = %conn_id, "Waiting player left the queue");
            return;
        }

        let Some(room) = self.registry.room_for(&conn_id) else {
            return;
        };

        if let Some(role) = room.role_of(conn_id) {
            room.member_left(role);
        }
        self.registry.remove(&room);

        info!(
            conn_id = %conn_id,
            room_id = %room.id(),
            active_rooms = self.registry.active_rooms(),
            "Room torn down"
        );
    }

    pub fn active_rooms(&self) -> usize {
        self.registry.active_rooms()
    }

    /// Connections that are either waiting or seated in a room
    pub fn connected_players(&self) -> usize {
        let queue = self.queue.lock();
        queue.len() + self.registry.registered_connections()
    }

    pub fn is_waiting(&self, conn_id: Uuid) -> bool {
        self.queue.lock().contains(conn_id)
    }

    /// How long the parked connection has been waiting, if there is one
    pub fn waiting_for(&self) -> Option<Duration> {
        self.queue.lock().waiting().map(|p| p.wait_time())
    }

    pub fn room_for(&self, conn_id: Uuid) -> Option<Arc<Room>> {
        self.registry.room_for(&conn_id)
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}
