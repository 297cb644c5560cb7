use async_trait::async_trait;
use uuid::Uuid;

use super::{Page, PageParams};
use crate::{
    db::error::DbResult,
    models::{GroupCount, NewUser, UpdateUser, User, UserFilter, UserSummary},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a user. A duplicate email is a `Conflict`.
    async fn create(&self, input: NewUser) -> DbResult<User>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>>;
    /// Look up by normalised (lowercase) email.
    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>>;
    /// Summaries for the given ids. Unknown ids are skipped.
    async fn get_summaries(&self, ids: &[Uuid]) -> DbResult<Vec<UserSummary>>;
    async fn list(&self, filter: &UserFilter, params: PageParams) -> DbResult<Page<User>>;
    async fn update(&self, id: Uuid, input: UpdateUser) -> DbResult<User>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
    async fn count(&self) -> DbResult<i64>;
    async fn count_by_role(&self) -> DbResult<Vec<GroupCount>>;
}
