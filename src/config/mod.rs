//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Delay before an emptied magazine is refilled
    pub reload_delay: Duration,
    /// Concurrent rooms allowed before new arrivals get `full`.
    /// `1` gives a single-duel server: a third client is turned away.
    pub max_rooms: usize,
    /// `move` / `aim` messages per second allowed per connection
    pub input_rate_limit: u32,

    /// Game page served on `/`
    pub static_page: PathBuf,
    /// Allowed client origins for CORS, empty means any
    pub client_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: "info".to_string(),
            reload_delay: Duration::from_millis(2000),
            max_rooms: 32,
            input_rate_limit: 60,
            static_page: PathBuf::from("public/index.html"),
            client_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, missing keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match (lookup("PORT"), lookup("SERVER_ADDR")) {
            (Some(port), _) => format!("0.0.0.0:{}", port.trim())
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            (None, Some(addr)) => addr.parse().map_err(|_| ConfigError::InvalidAddress)?,
            (None, None) => defaults.server_addr,
        };

        let reload_delay = match lookup("RELOAD_DELAY_MS") {
            Some(ms) => Duration::from_millis(parse_number("RELOAD_DELAY_MS", &ms)?),
            None => defaults.reload_delay,
        };

        let max_rooms = match lookup("MAX_ROOMS") {
            Some(n) => parse_number("MAX_ROOMS", &n)?,
            None => defaults.max_rooms,
        };

        let input_rate_limit = match lookup("INPUT_RATE_LIMIT") {
            Some(n) => parse_number("INPUT_RATE_LIMIT", &n)?,
            None => defaults.input_rate_limit,
        };

        let client_origins = lookup("CLIENT_ORIGIN")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server_addr,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            reload_delay,
            max_rooms,
            input_rate_limit,
            static_page: lookup("STATIC_PAGE")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_page),
            client_origins,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(key, value.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid value for {0}: {1:?}")]
    InvalidNumber(&'static str, String),
}
