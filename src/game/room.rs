//! Duel room: interprets player input and keeps both clients in sync

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ws::connection::Connection;
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::player::{Pair, PlayerState, Role, MAX_AMMO};

/// A fired round, as reported by the shooter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub owner: Role,
}

/// Mutable room state. Only ever touched with the room lock held, which is
/// what serializes inputs from the two members.
struct RoomState {
    players: Pair<PlayerState>,
    active: bool,
    next_bullet_id: u64,
    reload_timers: Pair<Option<JoinHandle<()>>>,
}

impl RoomState {
    fn broadcast(&self, msg: ServerMsg) {
        for (_, player) in self.players.iter() {
            player.conn.send(msg.clone());
        }
    }

    fn broadcast_snapshot(&self) {
        self.broadcast(ServerMsg::StateUpdate {
            player1: self.players[Role::First].snapshot(),
            player2: self.players[Role::Second].snapshot(),
        });
    }

    /// Flip to inactive and cancel anything still scheduled
    fn deactivate(&mut self) {
        self.active = false;
        for role in Role::BOTH {
            if let Some(timer) = self.reload_timers[role].take() {
                timer.abort();
            }
        }
    }
}

/// A paired duel between two connections
pub struct Room {
    id: Uuid,
    reload_delay: Duration,
    state: Mutex<RoomState>,
}

impl Room {
    /// `first` is the connection that was waiting, `second` the new arrival
    pub fn new(
        id: Uuid,
        first: Connection,
        second: Connection,
        reload_delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            reload_delay,
            state: Mutex::new(RoomState {
                players: Pair::new(
                    PlayerState::new(Role::First, first),
                    PlayerState::new(Role::Second, second),
                ),
                active: true,
                next_bullet_id: 0,
                reload_timers: Pair::new(None, None),
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// Connection ids of both members, first then second
    pub fn member_ids(&self) -> [Uuid; 2] {
        let state = self.state.lock();
        Role::BOTH.map(|role| state.players[role].conn.id())
    }

    /// Which seat a connection occupies, if it belongs here at all
    pub fn role_of(&self, conn_id: Uuid) -> Option<Role> {
        let state = self.state.lock();
        Role::BOTH
            .into_iter()
            .find(|&role| state.players[role].conn.id() == conn_id)
    }

    /// Tell each member which seat they got
    pub fn announce(&self) {
        let state = self.state.lock();
        for (role, player) in state.players.iter() {
            player.conn.send(ServerMsg::Matched {
                role,
                room_id: self.id,
            });
        }
    }

    /// Apply one input from `role` and broadcast the outcome
    pub fn handle_input(self: &Arc<Self>, role: Role, msg: ClientMsg) {
        let mut state = self.state.lock();
        if !state.active {
            debug!(room_id = %self.id, ?role, "Ignoring input for inactive room");
            return;
        }

        match msg {
            ClientMsg::Move {
                vel_x,
                vel_y,
                base_x,
                base_y,
            } => {
                let player = &mut state.players[role];
                player.x = base_x;
                player.y = base_y;
                player.vel_x = vel_x;
                player.vel_y = vel_y;
            }
            ClientMsg::Aim { angle } => {
                state.players[role].angle = angle;
            }
            ClientMsg::Shoot {
                bullet_x,
                bullet_y,
                angle,
                recoil_vel_x,
                recoil_vel_y,
            } => {
                if state.players[role].spend_round() {
                    let bullet = Bullet {
                        id: state.next_bullet_id,
                        x: bullet_x,
                        y: bullet_y,
                        angle,
                        owner: role,
                    };
                    state.next_bullet_id += 1;

                    let player = &mut state.players[role];
                    player.recoil_vel_x = recoil_vel_x;
                    player.recoil_vel_y = recoil_vel_y;
                    let ammo = player.ammo;

                    state.broadcast(ServerMsg::PlayerShoot {
                        player_id: bullet.owner,
                        bullet_id: bullet.id,
                        bullet_x: bullet.x,
                        bullet_y: bullet.y,
                        angle: bullet.angle,
                        ammo,
                    });

                    if ammo == 0 {
                        self.schedule_reload(&mut state, role);
                    }
                }
            }
            ClientMsg::Hit => {
                let target = role.opponent();
                let knocked_out = state.players[target].take_hit();
                let health = state.players[target].health;
                state.broadcast(ServerMsg::PlayerHit {
                    player_id: target,
                    health,
                });

                if knocked_out {
                    state.deactivate();
                    state.broadcast(ServerMsg::GameOver { winner: role });
                    info!(room_id = %self.id, winner = ?role, "Duel finished");
                }
            }
            ClientMsg::Ready => {
                let was_ready = state.players[role].ready;
                state.players[role].ready = true;
                if !was_ready && Role::BOTH.iter().all(|&r| state.players[r].ready) {
                    state.broadcast(ServerMsg::GameStart);
                    info!(room_id = %self.id, "Both players ready, duel started");
                }
            }
            ClientMsg::Unknown => {
                debug!(room_id = %self.id, ?role, "Ignoring unknown input type");
                return;
            }
        }

        state.broadcast_snapshot();
    }

    /// Mark the room finished because `role` went away and tell the other side
    pub fn member_left(&self, role: Role) {
        let mut state = self.state.lock();
        state.deactivate();
        state.players[role.opponent()].conn.send(ServerMsg::OpponentLeft);
        info!(room_id = %self.id, ?role, "Player left room");
    }

    fn schedule_reload(self: &Arc<Self>, state: &mut RoomState, role: Role) {
        let room: Weak<Room> = Arc::downgrade(self);
        let delay = self.reload_delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(room) = room.upgrade() {
                room.finish_reload(role);
            }
        });

        if let Some(previous) = state.reload_timers[role].replace(timer) {
            previous.abort();
        }
        debug!(room_id = %self.id, ?role, delay_ms = delay.as_millis() as u64, "Reload scheduled");
    }

    fn finish_reload(&self, role: Role) {
        let mut state = self.state.lock();
        state.reload_timers[role] = None;
        if !state.active {
            return;
        }

        state.players[role].ammo = MAX_AMMO;
        state.broadcast(ServerMsg::PlayerReload {
            player_id: role,
            ammo: MAX_AMMO,
        });
        state.broadcast_snapshot();
    }
}

impl Drop for Room {
    fn drop(&mut self) {
        self.state.get_mut().deactivate();
    }
}
