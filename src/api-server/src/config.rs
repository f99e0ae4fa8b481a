//! Server configuration
//!
//! Every setting comes from an environment variable:
//!
//! - `HOST`, `PORT`: bind address (default `0.0.0.0:8080`)
//! - `LOG_LEVEL`: fallback filter when `RUST_LOG` is unset (default `info`)
//! - `SCOPES_STORAGE`: `memory`, `postgres` or `rocksdb` (default `memory`)
//! - `DATABASE_URL`: required for `postgres`
//! - `SCOPES_ROCKSDB_PATH`: RocksDB directory (default `./data/scopes`)
//! - `SCOPES_PUBLIC_KEY`: base64 Ed25519 key that request payloads are verified against

use ed25519_dalek::VerifyingKey;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const HOST: &str = "HOST";
pub const PORT: &str = "PORT";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const SCOPES_STORAGE: &str = "SCOPES_STORAGE";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const SCOPES_ROCKSDB_PATH: &str = "SCOPES_ROCKSDB_PATH";
pub const SCOPES_PUBLIC_KEY: &str = "SCOPES_PUBLIC_KEY";

/// Configuration errors, each naming the offending variable
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where scopes are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
    Rocksdb,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "rocksdb" => Ok(StorageBackend::Rocksdb),
            other => Err(format!(
                "unknown storage backend {:?}, expected memory, postgres or rocksdb",
                other
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres => "postgres",
            StorageBackend::Rocksdb => "rocksdb",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,

    /// Storage backend
    pub storage: StorageBackend,

    /// PostgreSQL connection string
    pub database_url: Option<String>,

    /// RocksDB data directory
    pub rocksdb_path: PathBuf,

    /// Base64-encoded Ed25519 verifying key
    pub public_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            storage: StorageBackend::Memory,
            database_url: None,
            rocksdb_path: PathBuf::from("./data/scopes"),
            public_key: String::new(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let port = match get(PORT) {
            Some(value) => value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: PORT,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.port,
        };

        let storage = match get(SCOPES_STORAGE) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|reason| ConfigError::Invalid {
                    var: SCOPES_STORAGE,
                    value: value.clone(),
                    reason,
                })?,
            None => defaults.storage,
        };

        let database_url = get(DATABASE_URL);
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing(DATABASE_URL));
        }

        let public_key = get(SCOPES_PUBLIC_KEY).ok_or(ConfigError::Missing(SCOPES_PUBLIC_KEY))?;

        let config = Self {
            host: get(HOST).unwrap_or(defaults.host),
            port,
            log_level: get(LOG_LEVEL).unwrap_or(defaults.log_level),
            storage,
            database_url,
            rocksdb_path: get(SCOPES_ROCKSDB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.rocksdb_path),
            public_key,
        };
        config.verifying_key()?;
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Decode the configured public key
    pub fn verifying_key(&self) -> Result<VerifyingKey, ConfigError> {
        lockbox_auth::verifying_key_from_base64(&self.public_key).map_err(|e| {
            ConfigError::Invalid {
                var: SCOPES_PUBLIC_KEY,
                value: self.public_key.clone(),
                reason: e.to_string(),
            }
        })
    }
}
