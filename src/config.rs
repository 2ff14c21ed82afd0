// src/config.rs

use std::{env, str::FromStr, time::Duration};

use dotenvy::dotenv;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Operating environment (development | staging | production).
    pub env: String,
    pub database_url: String,
    pub db_max_open_conns: u32,
    pub db_max_idle_time: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            port: parse_or("PORT", 7001)?,
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            database_url,
            db_max_open_conns: parse_or("DB_MAX_OPEN_CONNS", 25)?,
            db_max_idle_time: Duration::from_secs(parse_or("DB_MAX_IDLE_TIME_SECS", 900)?),
            rust_log,
        })
    }
}

/// Reads `name` from the environment, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
