//! Database configuration.
//!
//! Loaded from a TOML file or from `WEFT_DB_*` environment variables
//! (`.env` files honored via dotenvy). `user`, `password`, and `database`
//! are required; everything else has a sensible default.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, WeftError};

/// Connection and pool settings for [`crate::Db::connect`].
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,
    /// Connections kept warm.
    #[serde(default = "default_min_size")]
    pub min_size: u32,
    /// Hard ceiling on concurrently checked-out connections.
    #[serde(default = "default_max_size")]
    pub max_size: u32,
    /// Seconds to wait for a pooled connection before failing with
    /// [`WeftError::PoolExhausted`].
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_owned()
}

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8".to_owned()
}

fn default_autocommit() -> bool {
    true
}

fn default_min_size() -> u32 {
    1
}

fn default_max_size() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

impl DbConfig {
    /// Minimal config: required fields explicit, everything else defaulted.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            charset: default_charset(),
            autocommit: default_autocommit(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }

    /// Load config from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| {
            WeftError::config(format!("failed to read {}: {err}", path.display()))
        })?;
        toml::from_str(&content).map_err(|err| {
            WeftError::config(format!("failed to parse {}: {err}", path.display()))
        })
    }

    /// Load config from `WEFT_DB_*` environment variables. A `.env` file in
    /// the working directory is read first if present.
    ///
    /// `WEFT_DB_USER`, `WEFT_DB_PASSWORD`, and `WEFT_DB_NAME` are required;
    /// `WEFT_DB_HOST`, `WEFT_DB_PORT`, `WEFT_DB_CHARSET`,
    /// `WEFT_DB_MIN_SIZE`, and `WEFT_DB_MAX_SIZE` override defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let required = |key: &str| {
            env::var(key).map_err(|_| WeftError::config(format!("{key} not set")))
        };
        let mut config = Self::new(
            required("WEFT_DB_USER")?,
            required("WEFT_DB_PASSWORD")?,
            required("WEFT_DB_NAME")?,
        );
        if let Ok(host) = env::var("WEFT_DB_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("WEFT_DB_PORT") {
            config.port = port
                .parse()
                .map_err(|_| WeftError::config(format!("invalid WEFT_DB_PORT: {port}")))?;
        }
        if let Ok(charset) = env::var("WEFT_DB_CHARSET") {
            config.charset = charset;
        }
        if let Ok(min) = env::var("WEFT_DB_MIN_SIZE") {
            config.min_size = min
                .parse()
                .map_err(|_| WeftError::config(format!("invalid WEFT_DB_MIN_SIZE: {min}")))?;
        }
        if let Ok(max) = env::var("WEFT_DB_MAX_SIZE") {
            config.max_size = max
                .parse()
                .map_err(|_| WeftError::config(format!("invalid WEFT_DB_MAX_SIZE: {max}")))?;
        }
        Ok(config)
    }

    pub(crate) fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}
