//! Environment configuration.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HOST` | `0.0.0.0` | interface to bind |
//! | `PORT` | `3002` | port to bind |
//! | `DATABASE_URL` | unset | Postgres URL; when set, todos persist there |
//! | `CORS_ORIGIN` | `*` | value of `access-control-allow-origin` |
//!
//! Empty values count as unset. Log filtering is configured separately
//! through `RUST_LOG`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use http::header::HeaderValue;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3002;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid HOST `{0}`: expected an IP address")]
    Host(String),

    #[error("invalid PORT `{0}`: expected an integer in 0..=65535")]
    Port(String),

    #[error("invalid CORS_ORIGIN `{0}`: not a valid header value")]
    CorsOrigin(String),
}

/// Resolved service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    /// Selects the persistent store when present.
    pub database_url: Option<String>,
    pub cors_origin: HeaderValue,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match var("HOST") {
            Some(raw) => raw.trim().parse::<IpAddr>().map_err(|_| ConfigError::Host(raw))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Port(raw))?,
            None => DEFAULT_PORT,
        };
        let cors_origin = match var("CORS_ORIGIN") {
            Some(raw) => HeaderValue::from_str(raw.trim()).map_err(|_| ConfigError::CorsOrigin(raw))?,
            None => HeaderValue::from_static("*"),
        };

        Ok(Self {
            addr: SocketAddr::new(host, port),
            database_url: var("DATABASE_URL"),
            cors_origin,
        })
    }
}
