use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use strum_macros::{Display, EnumString};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Mysql,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    /// required for the MySQL backend only
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub storage: StorageBackend,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_admin_per_min: u32,

    pub api_prefix: String,
    pub log_level: tracing::Level,
    pub leave_type_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let storage: StorageBackend = parsed(&get, "STORAGE", StorageBackend::Mysql)?;
        let database_url = get("DATABASE_URL");
        if storage == StorageBackend::Mysql && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url,
            jwt_secret: required("JWT_SECRET")?,
            storage,
            rate_protected_per_min: parsed(&get, "RATE_PROTECTED_PER_MIN", 1000)?,
            rate_admin_per_min: parsed(&get, "RATE_ADMIN_PER_MIN", 120)?,
            api_prefix: get("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_level: parsed(&get, "LOG_LEVEL", tracing::Level::DEBUG)?,
            leave_type_cache_ttl: Duration::from_secs(parsed(&get, "LEAVE_TYPE_CACHE_TTL_SECS", 300)?),
        })
    }
}

fn parsed<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
