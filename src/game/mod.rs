//! Duel state and the per-room protocol interpreter

pub mod player;
pub mod room;

pub use player::{Pair, PlayerState, Role};
pub use room::Room;
