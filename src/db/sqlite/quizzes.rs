use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{CourseworkFilter, QuizRepo},
    },
    models::{CreateQuiz, Quiz, QuizQuestion, UpdateQuiz},
};

const QUIZ_COLUMNS: &str = "id, title, description, course_id, created_by, questions, max_points, duration, is_active, created_at, updated_at";

pub struct SqliteQuizRepo {
    pool: SqlitePool,
}

impl SqliteQuizRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_quiz(row: &sqlx::sqlite::SqliteRow) -> DbResult<Quiz> {
        let questions: String = row.get("questions");
        let questions: Vec<QuizQuestion> = serde_json::from_str(&questions)
            .map_err(|e| DbError::Internal(format!("Failed to parse quiz questions: {}", e)))?;

        Ok(Quiz {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            title: row.get("title"),
            description: row.get("description"),
            course_id: parse_uuid(&row.get::<String, _>("course_id"))?,
            created_by: parse_uuid(&row.get::<String, _>("created_by"))?,
            questions,
            max_points: row.get("max_points"),
            duration: row.get("duration"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl QuizRepo for SqliteQuizRepo {
    async fn create(&self, created_by: Uuid, input: CreateQuiz) -> DbResult<Quiz> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let is_active = input.is_active.unwrap_or(true);
        let questions_json = serde_json::to_string(&input.questions)?;

        sqlx::query(
            r#"
            INSERT INTO quizzes (id, title, description, course_id, created_by, questions, max_points, duration, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.course_id.to_string())
        .bind(created_by.to_string())
        .bind(&questions_json)
        .bind(input.max_points)
        .bind(input.duration)
        .bind(is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Quiz already exists"))?;

        Ok(Quiz {
            id,
            title: input.title,
            description: input.description,
            course_id: input.course_id,
            created_by,
            questions: input.questions,
            max_points: input.max_points,
            duration: input.duration,
            is_active,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Quiz>> {
        let query = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_quiz).transpose()
    }

    async fn list(&self, filter: CourseworkFilter) -> DbResult<Vec<Quiz>> {
        let query = format!(
            r#"
            SELECT {QUIZ_COLUMNS}
            FROM quizzes
            WHERE (? IS NULL OR course_id = ?) AND (? = 0 OR is_active = 1)
            ORDER BY created_at DESC, id DESC
            "#
        );
        let course_id = filter.course_id.map(|id| id.to_string());
        let rows = sqlx::query(&query)
            .bind(&course_id)
            .bind(&course_id)
            .bind(filter.active_only)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_quiz).collect()
    }

    async fn update(&self, id: Uuid, input: UpdateQuiz) -> DbResult<Quiz> {
        let mut quiz = self.get_by_id(id).await?.ok_or(DbError::NotFound)?;

        if let Some(title) = input.title {
            quiz.title = title;
        }
        if let Some(description) = input.description {
            quiz.description = Some(description);
        }
        if let Some(questions) = input.questions {
            quiz.questions = questions;
        }
        if let Some(max_points) = input.max_points {
            quiz.max_points = max_points;
        }
        if let Some(duration) = input.duration {
            quiz.duration = duration;
        }
        if let Some(is_active) = input.is_active {
            quiz.is_active = is_active;
        }
        quiz.updated_at = chrono::Utc::now();
        let questions_json = serde_json::to_string(&quiz.questions)?;

        sqlx::query(
            r#"
            UPDATE quizzes
            SET title = ?, description = ?, questions = ?, max_points = ?, duration = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(&questions_json)
        .bind(quiz.max_points)
        .bind(quiz.duration)
        .bind(quiz.is_active)
        .bind(quiz.updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Quiz already exists"))?;

        Ok(quiz)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM quizzes")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}
