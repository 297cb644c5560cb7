//! Authorization errors.

use thiserror::Error;

/// A denied decision. The two kinds map to distinct HTTP statuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// No valid caller identity.
    #[error("Access denied. No token provided.")]
    Unauthenticated,

    /// Valid identity, insufficient privilege.
    #[error("{0}")]
    Forbidden(String),
}

impl AuthzError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }
}
