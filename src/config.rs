use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub quote_api_url: String,
    pub wellness_write_mode: WellnessWriteMode,
    /// Seconds between background sweeps over every wallet; 0 disables.
    pub wellness_poll_secs: u64,
}

/// How concurrent recomputes for the same wallet are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellnessWriteMode {
    /// Per-wallet lock plus a write conditioned on the record that was read.
    Serialized,
    /// Plain upsert; overlapping recomputes race and the last write wins.
    LastWriteWins,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let quote_api_url = env_map
            .get("QUOTE_API_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("QUOTE_API_URL".to_string()))?;

        let wellness_write_mode = match env_map
            .get("WELLNESS_WRITE_MODE")
            .map(|s| s.as_str())
            .unwrap_or("serialized")
        {
            "serialized" => WellnessWriteMode::Serialized,
            "last_write_wins" => WellnessWriteMode::LastWriteWins,
            other => {
                return Err(ConfigError::InvalidValue(
                    "WELLNESS_WRITE_MODE".to_string(),
                    format!("must be serialized or last_write_wins, got {}", other),
                ))
            }
        };

        let wellness_poll_secs = env_map
            .get("WELLNESS_POLL_SECS")
            .map(|s| s.as_str())
            .unwrap_or("0")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "WELLNESS_POLL_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            quote_api_url,
            wellness_write_mode,
            wellness_poll_secs,
        })
    }
}
