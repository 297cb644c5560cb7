use thiserror::Error;

/// Storage failures, already sorted into what the caller can act on.
///
/// `NotFound`, `Conflict` and `Validation` carry meaning for the API; every
/// other variant is an operational failure and surfaces as a 500.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row matched the key. The service layer names the entity.
    #[error("Not found")]
    NotFound,

    /// A uniqueness or reference constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// A CHECK constraint rejected the write.
    #[error("{0}")]
    Validation(String),

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Quiz questions and answers are stored as JSON text columns.
    #[error("Malformed JSON column: {0}")]
    Column(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DbResult<T> = Result<T, DbError>;
