//! Server configuration with environment variable support.
//!
//! [`ServerConfig::from_env`] loads a `.env` file when one exists, then reads
//! `GENEVA_`-prefixed variables:
//!
//! | Variable            | Field        | Default            |
//! |---------------------|--------------|--------------------|
//! | `GENEVA_ADDR`       | `addr`       | `127.0.0.1:8080`   |
//! | `GENEVA_BODY_LIMIT` | `body_limit` | `1048576` (1 MiB)  |
//! | `GENEVA_LOG_FILTER` | `log_filter` | `info,geneva=debug` |
//!
//! # Example
//!
//! ```ignore
//! use geneva::prelude::*;
//!
//! let config = ServerConfig::from_env()?;
//! let addr = config.addr.clone();
//! let r = Engine::with_config(config);
//! r.run(&addr).await?;
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Default maximum request body size (1 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Default listen address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Default `tracing` filter, used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,geneva=debug";

/// Prefix of the environment variables read by [`ServerConfig::from_env`]
pub const ENV_PREFIX: &str = "GENEVA_";

/// Settings used by the engine and its server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server binds to
    pub addr: String,
    /// Maximum accepted request body size in bytes
    pub body_limit: usize,
    /// `tracing_subscriber::EnvFilter` directives
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load `.env` (if present), then read `GENEVA_*` variables.
    ///
    /// Missing variables keep their defaults; malformed values are an error.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_vars()
    }

    /// Read `GENEVA_*` variables without touching `.env`
    pub fn from_vars() -> Result<Self> {
        Ok(envy::prefixed(ENV_PREFIX).from_env::<Self>()?)
    }

    /// Set the listen address
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Set the maximum request body size
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Set the log filter directives
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

/// Deployment profile, read from `GENEVA_ENV`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Local development (the default)
    Development,
    /// Production deployment
    Production,
    /// Any other profile name
    Custom(String),
}

impl Environment {
    /// Detect the current environment from `GENEVA_ENV`.
    ///
    /// `production`/`prod` and `development`/`dev` are recognized; an unset
    /// variable means development.
    pub fn current() -> Self {
        match std::env::var("GENEVA_ENV").as_deref() {
            Ok("production") | Ok("prod") => Self::Production,
            Ok("development") | Ok("dev") | Err(_) => Self::Development,
            Ok(other) => Self::Custom(other.to_string()),
        }
    }

    /// Check if this is the production profile
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is the development profile
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Get the environment name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
