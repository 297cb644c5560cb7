//! Argon2id password hashing.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, Version,
    password_hash::{self, PasswordHasher as _, PasswordVerifier as _, SaltString},
};
use secrecy::{ExposeSecret, SecretString};

use super::AuthError;
use crate::config::PasswordHashConfig;

/// Longest accepted password. Hashing cost grows with input length.
pub const MAX_PASSWORD_LENGTH: usize = 512;

/// A cleartext password. It cannot be printed or serialized.
#[derive(Clone)]
pub struct Password(SecretString);

impl Password {
    pub fn new(password: &str) -> Result<Self, AuthError> {
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooLong {
                max: MAX_PASSWORD_LENGTH,
            });
        }
        Ok(Self(SecretString::from(password)))
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Creates and verifies PHC-format password hashes.
///
/// Hashing is CPU-bound, so the async helpers run it on the blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of a throwaway password with the configured parameters. A login
    /// for an unknown account is checked against it so both paths cost the
    /// same.
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(config: &PasswordHashConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::Internal(format!("invalid argon2 parameters: {e}")))?;

        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::default(), params),
            dummy_hash: Arc::from(""),
        };
        let dummy = hasher.hash(&Password::new("lyceum-unknown-account")?)?;
        hasher.dummy_hash = Arc::from(dummy);
        Ok(hasher)
    }

    pub fn hash(&self, password: &Password) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.0.expose_secret().as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` for a wrong password; `Err` only for a malformed hash.
    pub fn verify(&self, password: &Password, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("stored password hash is invalid: {e}")))?;

        match self
            .argon2
            .verify_password(password.0.expose_secret().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(format!(
                "failed to verify password: {e}"
            ))),
        }
    }

    pub async fn hash_blocking(&self, password: Password) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task failed: {e}")))?
    }

    pub async fn verify_blocking(&self, password: Password, hash: String) -> Result<bool, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("password verification task failed: {e}")))?
    }

    /// Spend a full verification on `password` when there is no stored hash
    /// to compare it with. The outcome is always a mismatch.
    pub async fn verify_unknown(&self, password: Password) -> Result<(), AuthError> {
        self.verify_blocking(password, self.dummy_hash.to_string())
            .await
            .map(|_| ())
    }
}
