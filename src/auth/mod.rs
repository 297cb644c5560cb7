//! Authentication: password hashing, session tokens and the caller identity
//! handlers receive.

mod error;
mod identity;
pub mod jwt;
pub mod password;

pub use error::AuthError;
pub use identity::CallerContext;
pub use jwt::{Claims, TokenIssuer};
pub use password::{Password, PasswordHasher};
