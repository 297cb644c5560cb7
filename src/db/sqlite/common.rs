use sqlx::error::DatabaseError;
use uuid::Uuid;

use crate::db::error::{DbError, DbResult};

/// Parse a UUID string from the database, returning a DbError on failure
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {}", e)))
}

/// Map constraint violations raised by a write into domain errors.
///
/// `conflict` is the message used when a uniqueness constraint fires.
/// Foreign key violations mean the row is still referenced (on delete) or
/// points at a missing parent (on insert); both surface as `Conflict`.
/// CHECK violations surface as `Validation`.
pub fn map_write_error(err: sqlx::Error, conflict: impl Into<String>) -> DbError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DbError::Conflict(conflict.into())
        }
        sqlx::Error::Database(db_err) if is_foreign_key_failure(db_err.as_ref()) => {
            DbError::Conflict("Record is referenced by, or references, another record".into())
        }
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
            DbError::Validation(db_err.message().to_string())
        }
        _ => DbError::from(err),
    }
}

/// SQLite reports a plain FK violation as 787, but an `ON DELETE RESTRICT`
/// that blocks a delete as 1811 (SQLITE_CONSTRAINT_TRIGGER), which sqlx
/// does not classify as a foreign key error.
fn is_foreign_key_failure(db_err: &dyn DatabaseError) -> bool {
    db_err.is_foreign_key_violation()
        || (db_err.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER)
            && db_err.message().contains("FOREIGN KEY"))
}

const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

/// `?, ?, ?` for an `IN (...)` clause with `n` bound values.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_parse_uuid_rejects_garbage() {
        assert!(matches!(parse_uuid("nope"), Err(DbError::Internal(_))));
    }
}
