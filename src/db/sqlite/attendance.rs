use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::AttendanceRepo,
    },
    models::Attendance,
};

const ATTENDANCE_COLUMNS: &str = "id, user_id, course_id, date, present, created_at, updated_at";

pub struct SqliteAttendanceRepo {
    pool: SqlitePool,
}

impl SqliteAttendanceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_attendance(row: &sqlx::sqlite::SqliteRow) -> DbResult<Attendance> {
        Ok(Attendance {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            user_id: parse_uuid(&row.get::<String, _>("user_id"))?,
            course_id: parse_uuid(&row.get::<String, _>("course_id"))?,
            date: row.get("date"),
            present: row.get("present"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl AttendanceRepo for SqliteAttendanceRepo {
    async fn upsert(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        date: NaiveDate,
        present: bool,
    ) -> DbResult<Attendance> {
        let now = chrono::Utc::now();

        // A single statement keeps concurrent marks for the same day from
        // creating two rows; the unique index arbitrates.
        sqlx::query(
            r#"
            INSERT INTO attendance (id, user_id, course_id, date, present, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, course_id, date)
            DO UPDATE SET present = excluded.present, updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(course_id.to_string())
        .bind(date)
        .bind(present)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Attendance already recorded"))?;

        let query = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE user_id = ? AND course_id = ? AND date = ?"
        );
        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(course_id.to_string())
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(Self::parse_attendance)
            .transpose()?
            .ok_or(DbError::NotFound)
    }

    async fn list_by_course(
        &self,
        course_id: Uuid,
        date: Option<NaiveDate>,
    ) -> DbResult<Vec<Attendance>> {
        let query = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance
            WHERE course_id = ? AND (? IS NULL OR date = ?)
            ORDER BY date DESC, user_id
            "#
        );
        let rows = sqlx::query(&query)
            .bind(course_id.to_string())
            .bind(date)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_attendance).collect()
    }

    async fn list_by_student(
        &self,
        user_id: Uuid,
        course_id: Option<Uuid>,
    ) -> DbResult<Vec<Attendance>> {
        let query = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance
            WHERE user_id = ? AND (? IS NULL OR course_id = ?)
            ORDER BY date DESC, course_id
            "#
        );
        let course_id = course_id.map(|id| id.to_string());
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(&course_id)
            .bind(&course_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_attendance).collect()
    }

    async fn list_by_date(
        &self,
        date: NaiveDate,
        course_id: Option<Uuid>,
    ) -> DbResult<Vec<Attendance>> {
        let query = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance
            WHERE date = ? AND (? IS NULL OR course_id = ?)
            ORDER BY course_id, user_id
            "#
        );
        let course_id = course_id.map(|id| id.to_string());
        let rows = sqlx::query(&query)
            .bind(date)
            .bind(&course_id)
            .bind(&course_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_attendance).collect()
    }
}
