use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{Enrollment, UpdateEnrollment},
};

#[async_trait]
pub trait EnrollmentRepo: Send + Sync {
    /// Create an active enrollment. A second active enrollment for the same
    /// (user, course) pair is a `Conflict`.
    async fn create(&self, user_id: Uuid, course_id: Uuid) -> DbResult<Enrollment>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Enrollment>>;
    async fn find_active(&self, user_id: Uuid, course_id: Uuid) -> DbResult<Option<Enrollment>>;
    async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<Enrollment>>;
    async fn list_by_course(&self, course_id: Uuid) -> DbResult<Vec<Enrollment>>;
    /// Apply progress/grade changes. The first time progress reaches 100,
    /// `completed_at` is stamped.
    async fn update(&self, id: Uuid, input: UpdateEnrollment) -> DbResult<Enrollment>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
    async fn count(&self) -> DbResult<i64>;
}
