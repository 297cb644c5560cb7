use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{AssignmentRepo, CourseworkFilter},
    },
    models::{Assignment, CreateAssignment, UpdateAssignment},
};

const ASSIGNMENT_COLUMNS: &str = "id, title, description, course_id, created_by, due_date, max_points, is_active, created_at, updated_at";

pub struct SqliteAssignmentRepo {
    pool: SqlitePool,
}

impl SqliteAssignmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_assignment(row: &sqlx::sqlite::SqliteRow) -> DbResult<Assignment> {
        Ok(Assignment {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            title: row.get("title"),
            description: row.get("description"),
            course_id: parse_uuid(&row.get::<String, _>("course_id"))?,
            created_by: parse_uuid(&row.get::<String, _>("created_by"))?,
            due_date: row.get("due_date"),
            max_points: row.get("max_points"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl AssignmentRepo for SqliteAssignmentRepo {
    async fn create(&self, created_by: Uuid, input: CreateAssignment) -> DbResult<Assignment> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let is_active = input.is_active.unwrap_or(true);

        sqlx::query(
            r#"
            INSERT INTO assignments (id, title, description, course_id, created_by, due_date, max_points, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.course_id.to_string())
        .bind(created_by.to_string())
        .bind(input.due_date)
        .bind(input.max_points)
        .bind(is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Assignment already exists"))?;

        Ok(Assignment {
            id,
            title: input.title,
            description: input.description,
            course_id: input.course_id,
            created_by,
            due_date: input.due_date,
            max_points: input.max_points,
            is_active,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Assignment>> {
        let query = format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_assignment).transpose()
    }

    async fn list(&self, filter: CourseworkFilter) -> DbResult<Vec<Assignment>> {
        let query = format!(
            r#"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM assignments
            WHERE (? IS NULL OR course_id = ?) AND (? = 0 OR is_active = 1)
            ORDER BY due_date ASC, id ASC
            "#
        );
        let course_id = filter.course_id.map(|id| id.to_string());
        let rows = sqlx::query(&query)
            .bind(&course_id)
            .bind(&course_id)
            .bind(filter.active_only)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_assignment).collect()
    }

    async fn update(&self, id: Uuid, input: UpdateAssignment) -> DbResult<Assignment> {
        let mut assignment = self.get_by_id(id).await?.ok_or(DbError::NotFound)?;

        if let Some(title) = input.title {
            assignment.title = title;
        }
        if let Some(description) = input.description {
            assignment.description = description;
        }
        if let Some(due_date) = input.due_date {
            assignment.due_date = due_date;
        }
        if let Some(max_points) = input.max_points {
            assignment.max_points = max_points;
        }
        if let Some(is_active) = input.is_active {
            assignment.is_active = is_active;
        }
        assignment.updated_at = chrono::Utc::now();

        sqlx::query(
            r#"
            UPDATE assignments
            SET title = ?, description = ?, due_date = ?, max_points = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&assignment.title)
        .bind(&assignment.description)
        .bind(assignment.due_date)
        .bind(assignment.max_points)
        .bind(assignment.is_active)
        .bind(assignment.updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Assignment already exists"))?;

        Ok(assignment)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM assignments")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}
