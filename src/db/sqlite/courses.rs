use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid, placeholders};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{CourseRepo, Page, PageParams},
    },
    models::{Course, CourseFilter, CourseSummary, CreateCourse, GroupCount, UpdateCourse},
};

const COURSE_COLUMNS: &str =
    "c.id AS id, c.title AS title, c.description AS description, c.category AS category, \
     c.thumbnail AS thumbnail, c.instructor_id AS instructor_id, c.is_active AS is_active, \
     c.created_at AS created_at, c.updated_at AS updated_at";

pub struct SqliteCourseRepo {
    pool: SqlitePool,
}

impl SqliteCourseRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_course(row: &sqlx::sqlite::SqliteRow) -> DbResult<Course> {
        Ok(Course {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            title: row.get("title"),
            description: row.get("description"),
            category: row.get("category"),
            thumbnail: row.get("thumbnail"),
            instructor_id: parse_uuid(&row.get::<String, _>("instructor_id"))?,
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl CourseRepo for SqliteCourseRepo {
    async fn create(&self, instructor_id: Uuid, input: CreateCourse) -> DbResult<Course> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let is_active = input.is_active.unwrap_or(true);

        sqlx::query(
            r#"
            INSERT INTO courses (id, title, description, category, thumbnail, instructor_id, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.thumbnail)
        .bind(instructor_id.to_string())
        .bind(is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Course already exists"))?;

        Ok(Course {
            id,
            title: input.title,
            description: input.description,
            category: input.category,
            thumbnail: input.thumbnail,
            instructor_id,
            is_active,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Course>> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_course).transpose()
    }

    async fn get_summaries(&self, ids: &[Uuid]) -> DbResult<Vec<CourseSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT id, title, description FROM courses WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(id.to_string());
        }
        let rows = q.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(CourseSummary {
                    id: parse_uuid(&row.get::<String, _>("id"))?,
                    title: row.get("title"),
                    description: row.get("description"),
                })
            })
            .collect()
    }

    async fn list_active(
        &self,
        filter: &CourseFilter,
        params: PageParams,
    ) -> DbResult<Page<Course>> {
        let params = params.normalized();
        let category = filter.category.as_deref();
        let search = filter.search.as_deref().map(like_pattern);

        let where_clause = r#"
            c.is_active = 1
            AND (? IS NULL OR c.category = ?)
            AND (? IS NULL OR c.title LIKE ? ESCAPE '\' OR c.description LIKE ? ESCAPE '\')
        "#;

        let count_query = format!("SELECT COUNT(*) AS count FROM courses c WHERE {where_clause}");
        let total: i64 = sqlx::query(&count_query)
            .bind(category)
            .bind(category)
            .bind(&search)
            .bind(&search)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?
            .get("count");

        let query = format!(
            r#"
            SELECT {COURSE_COLUMNS}
            FROM courses c
            WHERE {where_clause}
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT ? OFFSET ?
            "#
        );
        let rows = sqlx::query(&query)
            .bind(category)
            .bind(category)
            .bind(&search)
            .bind(&search)
            .bind(&search)
            .bind(i64::from(params.limit))
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(Self::parse_course)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total,
            params,
        })
    }

    async fn list_by_instructor(&self, instructor_id: Uuid) -> DbResult<Vec<Course>> {
        let query = format!(
            "SELECT {COURSE_COLUMNS} FROM courses c WHERE c.instructor_id = ? ORDER BY c.created_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(instructor_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_course).collect()
    }

    async fn list_by_student(&self, user_id: Uuid) -> DbResult<Vec<Course>> {
        let query = format!(
            r#"
            SELECT {COURSE_COLUMNS}
            FROM courses c
            JOIN enrollments e ON e.course_id = c.id
            WHERE e.user_id = ? AND e.is_active = 1
            ORDER BY e.enrolled_at DESC
            "#
        );
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_course).collect()
    }

    async fn update(&self, id: Uuid, input: UpdateCourse) -> DbResult<Course> {
        let mut course = self.get_by_id(id).await?.ok_or(DbError::NotFound)?;

        if let Some(title) = input.title {
            course.title = title;
        }
        if let Some(description) = input.description {
            course.description = description;
        }
        if let Some(category) = input.category {
            course.category = category;
        }
        if let Some(thumbnail) = input.thumbnail {
            course.thumbnail = Some(thumbnail);
        }
        if let Some(is_active) = input.is_active {
            course.is_active = is_active;
        }
        course.updated_at = chrono::Utc::now();

        sqlx::query(
            r#"
            UPDATE courses
            SET title = ?, description = ?, category = ?, thumbnail = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.category)
        .bind(&course.thumbnail)
        .bind(course.is_active)
        .bind(course.updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Course already exists"))?;

        Ok(course)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Course is still referenced"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM courses")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn count_by_category(&self) -> DbResult<Vec<GroupCount>> {
        let rows = sqlx::query(
            r#"
            SELECT category AS key, COUNT(*) AS count
            FROM courses
            GROUP BY category
            ORDER BY count DESC, category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| GroupCount {
                key: row.get("key"),
                count: row.get("count"),
            })
            .collect())
    }
}
