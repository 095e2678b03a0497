//! Pistol Duel relay server
//!
//! Pairs incoming WebSocket clients into two-player rooms and keeps both
//! sides of each duel in sync:
//! - Matchmaking with a single waiting slot
//! - Per-room interpretation of move/aim/shoot/hit/ready input
//! - Delayed reloads, win detection and disconnect teardown

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod matchmaking;
pub mod util;
pub mod ws;
