use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::EnrollmentRepo,
    },
    models::{Enrollment, UpdateEnrollment},
};

const ENROLLMENT_COLUMNS: &str = "id, user_id, course_id, progress, grade, enrolled_at, completed_at, is_active, created_at, updated_at";

pub struct SqliteEnrollmentRepo {
    pool: SqlitePool,
}

impl SqliteEnrollmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_enrollment(row: &sqlx::sqlite::SqliteRow) -> DbResult<Enrollment> {
        Ok(Enrollment {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            user_id: parse_uuid(&row.get::<String, _>("user_id"))?,
            course_id: parse_uuid(&row.get::<String, _>("course_id"))?,
            progress: row.get("progress"),
            grade: row.get("grade"),
            enrolled_at: row.get("enrolled_at"),
            completed_at: row.get("completed_at"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn list_where(&self, column: &str, id: Uuid) -> DbResult<Vec<Enrollment>> {
        let query = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE {column} = ? ORDER BY enrolled_at DESC, id DESC"
        );
        let rows = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_enrollment).collect()
    }
}

#[async_trait]
impl EnrollmentRepo for SqliteEnrollmentRepo {
    async fn create(&self, user_id: Uuid, course_id: Uuid) -> DbResult<Enrollment> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO enrollments (id, user_id, course_id, progress, grade, enrolled_at, completed_at, is_active, created_at, updated_at)
            VALUES (?, ?, ?, 0, NULL, ?, NULL, 1, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(course_id.to_string())
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Already enrolled in this course"))?;

        Ok(Enrollment {
            id,
            user_id,
            course_id,
            progress: 0.0,
            grade: None,
            enrolled_at: now,
            completed_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Enrollment>> {
        let query = format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_enrollment).transpose()
    }

    async fn find_active(&self, user_id: Uuid, course_id: Uuid) -> DbResult<Option<Enrollment>> {
        let query = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = ? AND course_id = ? AND is_active = 1"
        );
        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(course_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_enrollment).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<Enrollment>> {
        self.list_where("user_id", user_id).await
    }

    async fn list_by_course(&self, course_id: Uuid) -> DbResult<Vec<Enrollment>> {
        self.list_where("course_id", course_id).await
    }

    async fn update(&self, id: Uuid, input: UpdateEnrollment) -> DbResult<Enrollment> {
        let mut enrollment = self.get_by_id(id).await?.ok_or(DbError::NotFound)?;
        let now = chrono::Utc::now();

        if let Some(progress) = input.progress {
            enrollment.progress = progress;
        }
        if let Some(grade) = input.grade {
            enrollment.grade = Some(grade);
        }
        if enrollment.is_complete() && enrollment.completed_at.is_none() {
            enrollment.completed_at = Some(now);
        }
        enrollment.updated_at = now;

        sqlx::query(
            r#"
            UPDATE enrollments
            SET progress = ?, grade = ?, completed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(enrollment.progress)
        .bind(enrollment.grade)
        .bind(enrollment.completed_at)
        .bind(enrollment.updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Already enrolled in this course"))?;

        Ok(enrollment)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM enrollments")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}
