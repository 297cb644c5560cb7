use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ResultRepo,
    },
    models::{NewQuizResult, QuizAnswer, QuizResult},
};

const RESULT_COLUMNS: &str =
    "id, quiz_id, user_id, answers, score, percentage, completed_at, created_at, updated_at";

pub struct SqliteResultRepo {
    pool: SqlitePool,
}

impl SqliteResultRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_result(row: &sqlx::sqlite::SqliteRow) -> DbResult<QuizResult> {
        let answers: String = row.get("answers");
        let answers: Vec<QuizAnswer> = serde_json::from_str(&answers)
            .map_err(|e| DbError::Internal(format!("Failed to parse quiz answers: {}", e)))?;

        Ok(QuizResult {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            quiz_id: parse_uuid(&row.get::<String, _>("quiz_id"))?,
            user_id: parse_uuid(&row.get::<String, _>("user_id"))?,
            answers,
            score: row.get("score"),
            percentage: row.get("percentage"),
            completed_at: row.get("completed_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn list_where(&self, column: &str, id: Uuid) -> DbResult<Vec<QuizResult>> {
        let query = format!(
            "SELECT {RESULT_COLUMNS} FROM results WHERE {column} = ? ORDER BY completed_at DESC, id DESC"
        );
        let rows = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_result).collect()
    }
}

#[async_trait]
impl ResultRepo for SqliteResultRepo {
    async fn create(&self, input: NewQuizResult) -> DbResult<QuizResult> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let answers_json = serde_json::to_string(&input.answers)?;

        sqlx::query(
            r#"
            INSERT INTO results (id, quiz_id, user_id, answers, score, percentage, completed_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(input.quiz_id.to_string())
        .bind(input.user_id.to_string())
        .bind(&answers_json)
        .bind(input.score)
        .bind(input.percentage)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Quiz already taken"))?;

        Ok(QuizResult {
            id,
            quiz_id: input.quiz_id,
            user_id: input.user_id,
            answers: input.answers,
            score: input.score,
            percentage: input.percentage,
            completed_at: now,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<QuizResult>> {
        let query = format!("SELECT {RESULT_COLUMNS} FROM results WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_result).transpose()
    }

    async fn find(&self, quiz_id: Uuid, user_id: Uuid) -> DbResult<Option<QuizResult>> {
        let query = format!("SELECT {RESULT_COLUMNS} FROM results WHERE quiz_id = ? AND user_id = ?");
        let row = sqlx::query(&query)
            .bind(quiz_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_result).transpose()
    }

    async fn list_by_quiz(&self, quiz_id: Uuid) -> DbResult<Vec<QuizResult>> {
        self.list_where("quiz_id", quiz_id).await
    }

    async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<QuizResult>> {
        self.list_where("user_id", user_id).await
    }
}
