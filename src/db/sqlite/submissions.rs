use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::SubmissionRepo,
    },
    models::{CreateSubmission, GradeSubmission, Submission},
};

const SUBMISSION_COLUMNS: &str = "id, assignment_id, user_id, content, file_path, submitted_at, grade, feedback, created_at, updated_at";

pub struct SqliteSubmissionRepo {
    pool: SqlitePool,
}

impl SqliteSubmissionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_submission(row: &sqlx::sqlite::SqliteRow) -> DbResult<Submission> {
        Ok(Submission {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            assignment_id: parse_uuid(&row.get::<String, _>("assignment_id"))?,
            user_id: parse_uuid(&row.get::<String, _>("user_id"))?,
            content: row.get("content"),
            file_path: row.get("file_path"),
            submitted_at: row.get("submitted_at"),
            grade: row.get("grade"),
            feedback: row.get("feedback"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn list_where(&self, column: &str, id: Uuid) -> DbResult<Vec<Submission>> {
        let query = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE {column} = ? ORDER BY submitted_at DESC, id DESC"
        );
        let rows = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_submission).collect()
    }
}

#[async_trait]
impl SubmissionRepo for SqliteSubmissionRepo {
    async fn create(&self, user_id: Uuid, input: CreateSubmission) -> DbResult<Submission> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO submissions (id, assignment_id, user_id, content, file_path, submitted_at, grade, feedback, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, NULL, NULL, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(input.assignment_id.to_string())
        .bind(user_id.to_string())
        .bind(&input.content)
        .bind(&input.file_path)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Assignment already submitted"))?;

        Ok(Submission {
            id,
            assignment_id: input.assignment_id,
            user_id,
            content: input.content,
            file_path: input.file_path,
            submitted_at: now,
            grade: None,
            feedback: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Submission>> {
        let query = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_submission).transpose()
    }

    async fn find(&self, assignment_id: Uuid, user_id: Uuid) -> DbResult<Option<Submission>> {
        let query = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE assignment_id = ? AND user_id = ?"
        );
        let row = sqlx::query(&query)
            .bind(assignment_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_submission).transpose()
    }

    async fn list_by_assignment(&self, assignment_id: Uuid) -> DbResult<Vec<Submission>> {
        self.list_where("assignment_id", assignment_id).await
    }

    async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<Submission>> {
        self.list_where("user_id", user_id).await
    }

    async fn grade(&self, id: Uuid, input: GradeSubmission) -> DbResult<Submission> {
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET grade = ?, feedback = COALESCE(?, feedback), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(input.grade)
        .bind(&input.feedback)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Assignment already submitted"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}
