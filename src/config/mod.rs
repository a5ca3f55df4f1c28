use std::env;
use std::fmt::Display;
use std::str::FromStr;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

use crate::checkin::intake::DEFAULT_FRAME_QUEUE;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absent means the in-memory store is used.
    pub database_url: Option<String>,
    pub port: u16,
    pub max_connections: u32,
    pub frame_queue: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            port: parse_or("PORT", DEFAULT_PORT),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            frame_queue: parse_or("SCANNER_FRAME_QUEUE", DEFAULT_FRAME_QUEUE),
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!("Invalid {key} value '{raw}': {e}; using default {default}");
            default
        }),
        Err(_) => default,
    }
}
