mod error;
pub mod repos;
pub mod sqlite;

#[cfg(test)]
pub mod tests;

use std::{sync::Arc, time::Duration};

pub use error::{DbError, DbResult};
pub use repos::*;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    users: Arc<dyn UserRepo>,
    courses: Arc<dyn CourseRepo>,
    enrollments: Arc<dyn EnrollmentRepo>,
    assignments: Arc<dyn AssignmentRepo>,
    submissions: Arc<dyn SubmissionRepo>,
    quizzes: Arc<dyn QuizRepo>,
    results: Arc<dyn ResultRepo>,
    attendance: Arc<dyn AttendanceRepo>,
}

impl CachedRepos {
    fn sqlite(pool: &sqlx::SqlitePool) -> Self {
        Self {
            users: Arc::new(sqlite::SqliteUserRepo::new(pool.clone())),
            courses: Arc::new(sqlite::SqliteCourseRepo::new(pool.clone())),
            enrollments: Arc::new(sqlite::SqliteEnrollmentRepo::new(pool.clone())),
            assignments: Arc::new(sqlite::SqliteAssignmentRepo::new(pool.clone())),
            submissions: Arc::new(sqlite::SqliteSubmissionRepo::new(pool.clone())),
            quizzes: Arc::new(sqlite::SqliteQuizRepo::new(pool.clone())),
            results: Arc::new(sqlite::SqliteResultRepo::new(pool.clone())),
            attendance: Arc::new(sqlite::SqliteAttendanceRepo::new(pool.clone())),
        }
    }
}

/// Database pool holding every LMS collection.
///
/// Repositories are cached at construction time to avoid allocation on each access.
pub struct DbPool {
    pool: sqlx::SqlitePool,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos::sqlite(&pool);
        DbPool { pool, repos }
    }

    /// Create a database pool from configuration
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        let DatabaseConfig::Sqlite(cfg) = config;

        // Referential integrity relies on the store enforcing foreign keys.
        let options = SqliteConnectOptions::new()
            .filename(&cfg.path)
            .create_if_missing(cfg.create_if_missing)
            .foreign_keys(true)
            .journal_mode(if cfg.wal_mode {
                SqliteJournalMode::Wal
            } else {
                SqliteJournalMode::Delete
            })
            .busy_timeout(Duration::from_millis(cfg.busy_timeout_ms));

        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections)
            .connect_with(options)
            .await?;

        tracing::debug!(path = %cfg.path, "Opened SQLite database");
        Ok(Self::from_sqlite(pool))
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> DbResult<()> {
        tracing::info!("Running SQLite migrations");
        sqlx::migrate!("./migrations_sqlx/sqlite")
            .run(&self.pool)
            .await?;
        tracing::info!("SQLite migrations completed successfully");
        Ok(())
    }

    pub fn users(&self) -> Arc<dyn UserRepo> {
        Arc::clone(&self.repos.users)
    }

    pub fn courses(&self) -> Arc<dyn CourseRepo> {
        Arc::clone(&self.repos.courses)
    }

    pub fn enrollments(&self) -> Arc<dyn EnrollmentRepo> {
        Arc::clone(&self.repos.enrollments)
    }

    pub fn assignments(&self) -> Arc<dyn AssignmentRepo> {
        Arc::clone(&self.repos.assignments)
    }

    pub fn submissions(&self) -> Arc<dyn SubmissionRepo> {
        Arc::clone(&self.repos.submissions)
    }

    pub fn quizzes(&self) -> Arc<dyn QuizRepo> {
        Arc::clone(&self.repos.quizzes)
    }

    pub fn results(&self) -> Arc<dyn ResultRepo> {
        Arc::clone(&self.repos.results)
    }

    pub fn attendance(&self) -> Arc<dyn AttendanceRepo> {
        Arc::clone(&self.repos.attendance)
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
