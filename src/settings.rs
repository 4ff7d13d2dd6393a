//! Process settings from the environment (after `.env` is loaded by the binary).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_SCHEMA_PATH: &str = "schema/portfolio.json";
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct Settings {
    /// None selects the in-process memory store.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub schema_path: PathBuf,
    /// Log classified request errors.
    pub debug: bool,
    /// Retry bodies that fail strict JSON with single quotes swapped for double quotes.
    pub lenient_quotes: bool,
    pub body_limit: usize,
    pub max_connections: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
            debug: false,
            lenient_quotes: false,
            body_limit: DEFAULT_BODY_LIMIT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|_| ConfigError::Settings(format!("BIND_ADDR is not a socket address: '{}'", bind)))?;

        Ok(Settings {
            database_url: var("DATABASE_URL"),
            bind_addr,
            schema_path: var("SCHEMA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA_PATH)),
            debug: parse_flag("API_DEBUG", var("API_DEBUG"))?,
            lenient_quotes: parse_flag("API_LENIENT_QUOTES", var("API_LENIENT_QUOTES"))?,
            body_limit: parse_number("API_BODY_LIMIT", var("API_BODY_LIMIT"), DEFAULT_BODY_LIMIT)?,
            max_connections: parse_number(
                "DATABASE_MAX_CONNECTIONS",
                var("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
        })
    }
}

fn parse_flag(name: &str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(v) = value else { return Ok(false) };
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Settings(format!("{} is not a boolean: '{}'", name, v))),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::Settings(format!("{} is not a number: '{}'", name, v))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert!(s.database_url.is_none());
        assert_eq!(s.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(s.schema_path, PathBuf::from(DEFAULT_SCHEMA_PATH));
        assert!(!s.debug);
        assert!(!s.lenient_quotes);
        assert_eq!(s.body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(s.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("DATABASE_URL", "postgres://localhost/portfolio"),
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("API_DEBUG", "yes"),
            ("API_LENIENT_QUOTES", "1"),
            ("API_BODY_LIMIT", "1024"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/portfolio"));
        assert_eq!(s.bind_addr.port(), 9000);
        assert!(s.debug);
        assert!(s.lenient_quotes);
        assert_eq!(s.body_limit, 1024);
        assert_eq!(s.max_connections, 12);
    }

    #[test]
    fn test_blank_database_url_is_unset() {
        assert!(settings(&[("DATABASE_URL", "  ")]).unwrap().database_url.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(settings(&[("API_DEBUG", "maybe")]), Err(ConfigError::Settings(_))));
        assert!(matches!(settings(&[("API_BODY_LIMIT", "big")]), Err(ConfigError::Settings(_))));
        assert!(matches!(settings(&[("BIND_ADDR", "localhost")]), Err(ConfigError::Settings(_))));
    }
}
