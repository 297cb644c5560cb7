use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateSubmission, GradeSubmission, Submission},
};

#[async_trait]
pub trait SubmissionRepo: Send + Sync {
    /// Insert a submission. A second submission for the same
    /// (assignment, user) pair is a `Conflict`.
    async fn create(&self, user_id: Uuid, input: CreateSubmission) -> DbResult<Submission>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Submission>>;
    async fn find(&self, assignment_id: Uuid, user_id: Uuid) -> DbResult<Option<Submission>>;
    async fn list_by_assignment(&self, assignment_id: Uuid) -> DbResult<Vec<Submission>>;
    async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<Submission>>;
    async fn grade(&self, id: Uuid, input: GradeSubmission) -> DbResult<Submission>;
}
