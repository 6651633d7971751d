use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub memory_seed_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub log_format: LogFormat,
    pub log_level: String,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend: StoreBackend = get_parse_or(&lookup, "STORE_BACKEND", StoreBackend::Postgres)?;
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "Missing environment variable: DATABASE_URL".to_string(),
            ));
        }

        Ok(Self {
            server_address: get_required(&lookup, "SERVER_ADDRESS")?,
            store_backend,
            database_url,
            memory_seed_path: lookup("MEMORY_SEED_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            db_max_connections: get_parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout: Duration::from_secs(get_parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                30,
            )?),
            log_format: get_parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            max_body_bytes: get_parse_or(&lookup, "MAX_BODY_BYTES", 20 * 1024 * 1024)?,
        })
    }
}

fn get_required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_for_optional_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDRESS", "127.0.0.1:3000"),
            ("DATABASE_URL", "postgres://localhost/placement"),
        ]))
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = Config::from_lookup(lookup_from(&[("SERVER_ADDRESS", "127.0.0.1:3000")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("DATABASE_URL")));
    }

    #[test]
    fn memory_backend_runs_without_database() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDRESS", "127.0.0.1:3000"),
            ("STORE_BACKEND", "memory"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.database_url.is_none());
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.memory_seed_path.is_none());
    }

    #[test]
    fn memory_seed_path_is_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDRESS", "127.0.0.1:3000"),
            ("STORE_BACKEND", "memory"),
            ("MEMORY_SEED_PATH", "demos/memory_seed.json"),
        ]))
        .unwrap();
        assert_eq!(
            config.memory_seed_path,
            Some(PathBuf::from("demos/memory_seed.json"))
        );
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDRESS", "127.0.0.1:3000"),
            ("STORE_BACKEND", "memory"),
            ("DB_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("DB_MAX_CONNECTIONS")));
    }
}
