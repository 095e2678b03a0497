//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::Role;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMsg {
    /// Client-reported position and velocity
    Move {
        vel_x: f64,
        vel_y: f64,
        base_x: f64,
        base_y: f64,
    },

    /// Aim direction in radians
    Aim { angle: f64 },

    /// Fire one round from the reported muzzle position
    Shoot {
        bullet_x: f64,
        bullet_y: f64,
        angle: f64,
        #[serde(default)]
        recoil_vel_x: f64,
        #[serde(default)]
        recoil_vel_y: f64,
    },

    /// The opponent was hit by one of our bullets
    Hit,

    /// Player is ready to start the duel
    Ready,

    /// Any type tag we don't understand
    #[serde(other)]
    Unknown,
}

impl ClientMsg {
    /// Streamed every frame by the client, so a later one supersedes an
    /// earlier one. Everything else is a discrete game event.
    pub fn is_continuous(&self) -> bool {
        matches!(self, ClientMsg::Move { .. } | ClientMsg::Aim { .. })
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMsg {
    /// No opponent yet, connection is parked in the queue
    Waiting,

    /// Paired into a room
    Matched { role: Role, room_id: Uuid },

    /// Full view of both players, sent after every handled input
    StateUpdate {
        player1: PlayerSnapshot,
        player2: PlayerSnapshot,
    },

    /// A player fired
    PlayerShoot {
        player_id: Role,
        bullet_id: u64,
        bullet_x: f64,
        bullet_y: f64,
        angle: f64,
        ammo: u8,
    },

    /// A player's magazine was refilled
    PlayerReload { player_id: Role, ammo: u8 },

    /// A player took damage
    PlayerHit { player_id: Role, health: u8 },

    /// The duel is over
    GameOver { winner: Role },

    /// Both players are ready
    GameStart,

    /// The other member of the room disconnected
    OpponentLeft,

    /// Server is at capacity, connection will be closed
    Full,
}

/// Player state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub x: f64,
    pub y: f64,
    /// Aim in radians
    pub angle: f64,
    pub health: u8,
    pub ammo: u8,
    pub vel_x: f64,
    pub vel_y: f64,
    pub recoil_vel_x: f64,
    pub recoil_vel_y: f64,
    pub ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_messages() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"move","velX":1.5,"velY":-2,"baseX":10,"baseY":20}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMsg::Move {
                vel_x: 1.5,
                vel_y: -2.0,
                base_x: 10.0,
                base_y: 20.0,
            }
        );

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"hit","damage":9999}"#).unwrap();
        assert_eq!(msg, ClientMsg::Hit);

        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"shoot","bulletX":10,"bulletY":20,"angle":0}"#)
                .unwrap();
        assert!(matches!(
            msg,
            ClientMsg::Shoot { recoil_vel_x, .. } if recoil_vel_x == 0.0
        ));
    }

    #[test]
    fn unknown_type_is_not_a_parse_error() {
        let msg: ClientMsg = serde_json::from_str(r#"{"type":"teleport","x":1}"#).unwrap();
        assert_eq!(msg, ClientMsg::Unknown);
    }

    #[test]
    fn malformed_payloads_fail() {
        assert!(serde_json::from_str::<ClientMsg>("not json").is_err());
        assert!(serde_json::from_str::<ClientMsg>(r#"{"angle":1}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"aim"}"#).is_err());
    }

    #[test]
    fn server_messages_use_camel_case_tags() {
        let json = serde_json::to_value(ServerMsg::PlayerReload {
            player_id: Role::Second,
            ammo: 6,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "playerReload", "playerId": "player2", "ammo": 6})
        );

        let json = serde_json::to_value(ServerMsg::OpponentLeft).unwrap();
        assert_eq!(json, serde_json::json!({"type": "opponentLeft"}));
    }

    #[test]
    fn only_move_and_aim_are_continuous() {
        let aim = ClientMsg::Aim { angle: 0.0 };
        assert!(aim.is_continuous());
        assert!(ClientMsg::Move { vel_x: 0.0, vel_y: 0.0, base_x: 0.0, base_y: 0.0 }.is_continuous());

        for msg in [ClientMsg::Hit, ClientMsg::Ready, ClientMsg::Unknown] {
            assert!(!msg.is_continuous());
        }
        let shot = ClientMsg::Shoot {
            bullet_x: 0.0,
            bullet_y: 0.0,
            angle: 0.0,
            recoil_vel_x: 0.0,
            recoil_vel_y: 0.0,
        };
        assert!(!shot.is_continuous());
    }
}
