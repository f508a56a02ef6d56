//! Server settings read from `ENTMOOT_*` environment variables.

use std::net::SocketAddr;

use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "ENTMOOT_DATABASE_URL";
pub const BIND_ADDR_VAR: &str = "ENTMOOT_BIND_ADDR";
pub const DB_MAX_CONNECTIONS_VAR: &str = "ENTMOOT_DB_MAX_CONNECTIONS";

const DEFAULT_DATABASE_URL: &str = "sqlite://entmoot.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBindAddr { var: &'static str, value: String },
    #[error("{var} must be a positive integer, got {value}")]
    InvalidMaxConnections { var: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Unset variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup(DATABASE_URL_VAR) {
            Some(url) if url.trim().is_empty() => return Err(ConfigError::Empty(DATABASE_URL_VAR)),
            Some(url) => url.trim().to_string(),
            None => DEFAULT_DATABASE_URL.to_string(),
        };

        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr {
                var: BIND_ADDR_VAR,
                value: bind_addr.clone(),
            })?;

        let db_max_connections = match lookup(DB_MAX_CONNECTIONS_VAR) {
            None => DEFAULT_DB_MAX_CONNECTIONS,
            Some(value) => match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidMaxConnections {
                        var: DB_MAX_CONNECTIONS_VAR,
                        value,
                    });
                }
            },
        };

        Ok(Self {
            database_url,
            bind_addr,
            db_max_connections,
        })
    }
}
