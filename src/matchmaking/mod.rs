//! Pairing connections into rooms

pub mod queue;
pub mod registry;
pub mod session;

pub use session::{ConnectOutcome, SessionManager, SessionSettings};
