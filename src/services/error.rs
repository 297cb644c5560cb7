use thiserror::Error;

use crate::{
    auth::AuthError,
    authz::{AuthzError, ResolveError},
    db::DbError,
};

/// Failures of an LMS operation, one variant per outcome a client can see.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(DbError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ServiceError::NotFound("Resource not found".to_string()),
            DbError::Conflict(msg) => ServiceError::Conflict(msg),
            DbError::Validation(msg) => ServiceError::Validation(msg),
            _ => ServiceError::Database(err),
        }
    }
}

impl From<ResolveError> for ServiceError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(_) => ServiceError::NotFound(err.to_string()),
            ResolveError::Database(db_err) => db_err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_keep_their_kind() {
        assert!(matches!(
            ServiceError::from(DbError::Conflict("Already enrolled in this course".into())),
            ServiceError::Conflict(msg) if msg == "Already enrolled in this course"
        ));
        assert!(matches!(
            ServiceError::from(DbError::Validation("CHECK constraint failed".into())),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            ServiceError::from(DbError::Internal("boom".into())),
            ServiceError::Database(_)
        ));
    }

    #[test]
    fn test_resolve_not_found_message() {
        let err = ServiceError::from(ResolveError::NotFound("Quiz"));
        assert!(matches!(err, ServiceError::NotFound(msg) if msg == "Quiz not found"));
    }
}
