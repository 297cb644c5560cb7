use async_trait::async_trait;
use uuid::Uuid;

use super::CourseworkFilter;
use crate::{
    db::error::DbResult,
    models::{Assignment, CreateAssignment, UpdateAssignment},
};

#[async_trait]
pub trait AssignmentRepo: Send + Sync {
    async fn create(&self, created_by: Uuid, input: CreateAssignment) -> DbResult<Assignment>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Assignment>>;
    /// Matching assignments ordered by due date.
    async fn list(&self, filter: CourseworkFilter) -> DbResult<Vec<Assignment>>;
    async fn update(&self, id: Uuid, input: UpdateAssignment) -> DbResult<Assignment>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
    async fn count(&self) -> DbResult<i64>;
}
