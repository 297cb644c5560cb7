//! Configuration module for the LMS server.
//!
//! The server is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//!
//! [database]
//! type = "sqlite"
//! path = "lyceum.db"
//!
//! [auth]
//! jwt_secret = "${JWT_SECRET}"
//! ```

mod auth;
mod database;
mod observability;
mod server;

use std::{path::Path, str::FromStr, sync::LazyLock};

pub use auth::*;
pub use database::*;
pub use observability::*;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
pub use server::*;

/// Commented starting configuration written by `lyceum init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../../lyceum.example.toml");

/// Root configuration for the LMS server.
///
/// Every section has defaults, but `auth.jwt_secret` has no safe default
/// and must always be provided.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LmsConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration for persistent storage.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Session token and password hashing configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Observability configuration (logging).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl LmsConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        contents.parse()
    }

    /// Validate the configuration for consistency and completeness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.auth.validate()?;
        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::Validation(
                "server.body_limit_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl FromStr for LmsConfig {
    type Err = ConfigError;

    /// Parse configuration from a TOML string.
    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        let expanded = expand_env_vars(contents)?;
        let config: LmsConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Replace each `${NAME}` with the value of environment variable `NAME`.
///
/// Text after a `#` is a TOML comment and is copied untouched, so example
/// lines that are commented out don't need their variables set.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(input.len());

    for (i, line) in input.split('\n').enumerate() {
        if i > 0 {
            expanded.push('\n');
        }
        let (code, comment) = line.split_at(line.find('#').unwrap_or(line.len()));

        let mut missing = None;
        let code = ENV_VAR.replace_all(code, |cap: &Captures| {
            std::env::var(&cap[1]).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| cap[1].to_string());
                String::new()
            })
        });
        if let Some(name) = missing {
            return Err(ConfigError::EnvVarNotFound(name));
        }

        expanded.push_str(&code);
        expanded.push_str(comment);
    }

    Ok(expanded)
}
