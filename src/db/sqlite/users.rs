use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid, placeholders};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{Page, PageParams, UserRepo},
    },
    models::{GroupCount, NewUser, Role, UpdateUser, User, UserFilter, UserSummary},
};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role, phone, avatar, is_active, created_at, updated_at";

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_user(row: &sqlx::sqlite::SqliteRow) -> DbResult<User> {
        let role: String = row.get("role");
        let role: Role = role.parse().map_err(DbError::Internal)?;

        Ok(User {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            role,
            phone: row.get("phone"),
            avatar: row.get("avatar"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn create(&self, input: NewUser) -> DbResult<User> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, role, phone, avatar, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.role.as_str())
        .bind(&input.phone)
        .bind(&input.avatar)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "User already exists with this email"))?;

        Ok(User {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password_hash: input.password_hash,
            role: input.role,
            phone: input.phone,
            avatar: input.avatar,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_user).transpose()
    }

    async fn get_summaries(&self, ids: &[Uuid]) -> DbResult<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT id, first_name, last_name, email FROM users WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(id.to_string());
        }
        let rows = q.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(UserSummary {
                    id: parse_uuid(&row.get::<String, _>("id"))?,
                    first_name: row.get("first_name"),
                    last_name: row.get("last_name"),
                    email: row.get("email"),
                })
            })
            .collect()
    }

    async fn list(&self, filter: &UserFilter, params: PageParams) -> DbResult<Page<User>> {
        let params = params.normalized();
        let role = filter.role.map(|r| r.as_str());

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM users WHERE (? IS NULL OR role = ?)",
        )
        .bind(role)
        .bind(role)
        .fetch_one(&self.pool)
        .await?
        .get("count");

        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE (? IS NULL OR role = ?)
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#
        );
        let rows = sqlx::query(&query)
            .bind(role)
            .bind(role)
            .bind(i64::from(params.limit))
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(Self::parse_user)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total,
            params,
        })
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> DbResult<User> {
        let mut user = self.get_by_id(id).await?.ok_or(DbError::NotFound)?;

        if let Some(first_name) = input.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = input.email {
            user.email = email;
        }
        if let Some(phone) = input.phone {
            user.phone = Some(phone);
        }
        if let Some(avatar) = input.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(role) = input.role {
            user.role = role;
        }
        if let Some(is_active) = input.is_active {
            user.is_active = is_active;
        }
        user.updated_at = chrono::Utc::now();

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = ?, last_name = ?, email = ?, phone = ?, avatar = ?, role = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.avatar)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "User already exists with this email"))?;

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "User is still referenced"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn count_by_role(&self) -> DbResult<Vec<GroupCount>> {
        let rows = sqlx::query(
            "SELECT role AS key, COUNT(*) AS count FROM users GROUP BY role ORDER BY role",
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
