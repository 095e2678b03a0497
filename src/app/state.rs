//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::matchmaking::{SessionManager, SessionSettings};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // Initialize session manager (Arc for sharing across cloned AppState)
        let sessions = Arc::new(SessionManager::new(SessionSettings::from(&*config)));

        Self { config, sessions }
    }
}
