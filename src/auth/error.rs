use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("Account is deactivated")]
    InactiveAccount,

    /// The token failed signature or structural validation.
    #[error("Invalid token.")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    /// The token was valid but its user no longer exists or is inactive.
    #[error("Invalid token. User not found or inactive.")]
    UnknownUser,

    #[error("Password must be at most {max} characters")]
    PasswordTooLong { max: usize },

    /// Hashing or signing failed. Always a server-side fault.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether this error should reach the client as 401.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::InactiveAccount
                | AuthError::InvalidToken
                | AuthError::ExpiredToken
                | AuthError::UnknownUser
        )
    }
}
