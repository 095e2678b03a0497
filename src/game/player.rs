//! Per-player duel state and role-indexed storage

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::ws::connection::Connection;
use crate::ws::protocol::PlayerSnapshot;

/// Starting (and maximum) health
pub const MAX_HEALTH: u8 = 100;
/// Magazine size
pub const MAX_AMMO: u8 = 6;
/// Damage applied by one `hit`
pub const HIT_DAMAGE: u8 = 20;

/// Seat in a room. `First` is whoever was waiting, `Second` the arrival that
/// completed the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "player1")]
    First,
    #[serde(rename = "player2")]
    Second,
}

impl Role {
    pub const BOTH: [Role; 2] = [Role::First, Role::Second];

    pub fn opponent(self) -> Role {
        match self {
            Role::First => Role::Second,
            Role::Second => Role::First,
        }
    }
}

/// Exactly one value per role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pair<T> {
    first: T,
    second: T,
}

impl<T> Pair<T> {
    pub fn new(first: T, second: T) -> Self {
        Self { first, second }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        [(Role::First, &self.first), (Role::Second, &self.second)].into_iter()
    }
}

impl<T> Index<Role> for Pair<T> {
    type Output = T;

    fn index(&self, role: Role) -> &T {
        match role {
            Role::First => &self.first,
            Role::Second => &self.second,
        }
    }
}

impl<T> IndexMut<Role> for Pair<T> {
    fn index_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::First => &mut self.first,
            Role::Second => &mut self.second,
        }
    }
}

/// Player state in a room
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub role: Role,
    pub conn: Connection,

    // Position and movement, accepted verbatim from the client
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub recoil_vel_x: f64,
    pub recoil_vel_y: f64,

    // Server-owned
    pub health: u8,
    pub ammo: u8,
    pub ready: bool,
}

impl PlayerState {
    pub fn new(role: Role, conn: Connection) -> Self {
        Self {
            role,
            conn,
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            vel_x: 0.0,
            vel_y: 0.0,
            recoil_vel_x: 0.0,
            recoil_vel_y: 0.0,
            health: MAX_HEALTH,
            ammo: MAX_AMMO,
            ready: false,
        }
    }

    /// Apply one hit's worth of damage, returns true if this knocked the player out
    pub fn take_hit(&mut self) -> bool {
        self.health = self.health.saturating_sub(HIT_DAMAGE);
        self.health == 0
    }

    /// Spend one round. Returns false (and changes nothing) when empty.
    pub fn spend_round(&mut self) -> bool {
        if self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        true
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            x: self.x,
            y: self.y,
            angle: self.angle,
            health: self.health,
            ammo: self.ammo,
            vel_x: self.vel_x,
            vel_y: self.vel_y,
            recoil_vel_x: self.recoil_vel_x,
            recoil_vel_y: self.recoil_vel_y,
            ready: self.ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerState {
        let (conn, _rx) = Connection::channel();
        PlayerState::new(Role::First, conn)
    }

    #[test]
    fn pair_indexes_by_role() {
        let mut pair = Pair::new(1, 2);
        pair[Role::Second] += 10;
        assert_eq!(pair[Role::First], 1);
        assert_eq!(pair[Role::Second], 12);
        assert_eq!(Role::First.opponent(), Role::Second);
        assert_eq!(Role::Second.opponent(), Role::First);
    }

    #[test]
    fn health_bottoms_out_at_zero() {
        let mut p = player();
        for _ in 0..4 {
            assert!(!p.take_hit());
        }
        assert_eq!(p.health, 20);
        assert!(p.take_hit());
        assert_eq!(p.health, 0);
        assert!(p.take_hit());
        assert_eq!(p.health, 0);
    }

    #[test]
    fn empty_magazine_refuses_to_fire() {
        let mut p = player();
        for expected in (0..MAX_AMMO).rev() {
            assert!(p.spend_round());
            assert_eq!(p.ammo, expected);
        }
        assert!(!p.spend_round());
        assert_eq!(p.ammo, 0);
    }

    #[test]
    fn roles_serialize_as_player_slots() {
        assert_eq!(serde_json::to_string(&Role::First).unwrap(), "\"player1\"");
        assert_eq!(serde_json::to_string(&Role::Second).unwrap(), "\"player2\"");
    }
}
