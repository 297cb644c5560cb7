use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Shortest accepted HS256 signing secret, in bytes.
const MIN_JWT_SECRET_LEN: usize = 16;

/// One year.
const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Authentication configuration: session tokens and password hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Secret used to sign and verify session tokens (HS256).
    /// Usually supplied through the environment, e.g. `jwt_secret = "${JWT_SECRET}"`.
    #[serde(default)]
    pub jwt_secret: String,

    /// Session token lifetime in seconds. Defaults to 7 days.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Name of the cookie that carries the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Mark the session cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub secure_cookies: bool,

    /// Argon2id cost parameters for password hashing.
    #[serde(default)]
    pub password: PasswordHashConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
            cookie_name: default_cookie_name(),
            secure_cookies: false,
            password: PasswordHashConfig::default(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Validation(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }
        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Validation(format!(
                "auth.token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}"
            )));
        }
        if self.cookie_name.is_empty() {
            return Err(ConfigError::Validation(
                "auth.cookie_name cannot be empty".into(),
            ));
        }
        self.password.validate()
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

fn default_token_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_cookie_name() -> String {
    "token".to_string()
}

/// Argon2id parameters. Defaults follow the `argon2` crate's recommended
/// values; raising them makes each login proportionally slower.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl PasswordHashConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 || self.parallelism == 0 {
            return Err(ConfigError::Validation(
                "auth.password iterations and parallelism must be at least 1".into(),
            ));
        }
        if self.memory_kib < 8 * self.parallelism {
            return Err(ConfigError::Validation(
                "auth.password.memory_kib must be at least 8 KiB per lane".into(),
            ));
        }
        Ok(())
    }
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
