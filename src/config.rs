use crate::engine::DEFAULT_ATR_PERIOD;
use crate::orchestration::DEFAULT_CACHE_CAPACITY;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub cache_capacity: NonZeroUsize,
    pub atr_period: usize,
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

        let cache_capacity = parse_positive(&env_map, "CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;
        let atr_period = parse_positive(&env_map, "ATR_PERIOD", DEFAULT_ATR_PERIOD)?.get();

        Ok(Config {
            port,
            database_path,
            cache_capacity,
            atr_period,
        })
    }
}

fn parse_positive(
    env_map: &HashMap<String, String>,
    key: &str,
    default: usize,
) -> Result<NonZeroUsize, ConfigError> {
    let invalid = || ConfigError::InvalidValue(key.to_string(), "must be a positive integer".to_string());
    match env_map.get(key) {
        Some(raw) => raw.trim().parse::<NonZeroUsize>().map_err(|_| invalid()),
        None => NonZeroUsize::new(default).ok_or_else(invalid),
    }
}
