use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{NewQuizResult, QuizResult},
};

#[async_trait]
pub trait ResultRepo: Send + Sync {
    /// Insert a scored attempt. A second attempt for the same
    /// (quiz, user) pair is a `Conflict`.
    async fn create(&self, input: NewQuizResult) -> DbResult<QuizResult>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<QuizResult>>;
    async fn find(&self, quiz_id: Uuid, user_id: Uuid) -> DbResult<Option<QuizResult>>;
    async fn list_by_quiz(&self, quiz_id: Uuid) -> DbResult<Vec<QuizResult>>;
    async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<QuizResult>>;
}
