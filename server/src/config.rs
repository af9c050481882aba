//! Startup configuration read from environment variables.

use axum::http::HeaderValue;
use std::env;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "larder.db";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";
pub const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} is not valid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub cors_allowed_origins: Vec<HeaderValue>,
    pub pool_size: u32,
    /// Return the `X-DB-Query-Count` header on every response
    pub track_db_query_count: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Unset and empty variables take their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let database_url = var("DATABASE_URL", DEFAULT_DATABASE_URL);

        let bind_address = var("BIND_ADDRESS", DEFAULT_BIND_ADDRESS);
        let bind_address = bind_address
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDRESS",
                reason: format!("{:?}: {}", bind_address, e),
            })?;

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                    name: "CORS_ALLOWED_ORIGINS",
                    reason: format!("{:?}: {}", origin, e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pool_size = var("DATABASE_POOL_SIZE", &DEFAULT_POOL_SIZE.to_string());
        let pool_size = match pool_size.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "DATABASE_POOL_SIZE",
                    reason: format!("expected a positive integer, got {:?}", pool_size),
                })
            }
        };

        let track_db_query_count = match var("TRACK_DB_QUERY_COUNT", "0").as_str() {
            "1" | "true" => true,
            "0" | "false" => false,
            other => {
                return Err(ConfigError::Invalid {
                    name: "TRACK_DB_QUERY_COUNT",
                    reason: format!("expected 1, 0, true or false, got {:?}", other),
                })
            }
        };

        Ok(Self {
            database_url,
            bind_address,
            cors_allowed_origins,
            pool_size,
            track_db_query_count,
        })
    }
}
