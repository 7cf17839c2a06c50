//! Server configuration from the environment.

use scribble_room::RoomConfig;

/// Listen address when `SCRIBBLE_BIND` is unset.
pub const DEFAULT_BIND: &str = "0.0.0.0:42069";

/// Environment variable names.
pub const ENV_BIND: &str = "SCRIBBLE_BIND";
pub const ENV_ROUND_SECS: &str = "SCRIBBLE_ROUND_SECS";
pub const ENV_MAX_ROUNDS: &str = "SCRIBBLE_MAX_ROUNDS";

/// An environment value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

/// Everything needed to start a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind: String,
    /// Rules for the room.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `SCRIBBLE_BIND`, `SCRIBBLE_ROUND_SECS` and
    /// `SCRIBBLE_MAX_ROUNDS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bind) = lookup(ENV_BIND) {
            let bind = bind.trim();
            if bind.is_empty() {
                return Err(ConfigError::Empty { key: ENV_BIND });
            }
            config.bind = bind.to_string();
        }
        if let Some(value) = lookup(ENV_ROUND_SECS) {
            config.room.round_secs = positive(ENV_ROUND_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_ROUNDS) {
            config.room.max_rounds = positive(ENV_MAX_ROUNDS, &value)?;
        }

        Ok(config)
    }
}

fn positive(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
    }
}
