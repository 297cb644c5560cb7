use async_trait::async_trait;
use uuid::Uuid;

use super::CourseworkFilter;
use crate::{
    db::error::DbResult,
    models::{CreateQuiz, Quiz, UpdateQuiz},
};

#[async_trait]
pub trait QuizRepo: Send + Sync {
    async fn create(&self, created_by: Uuid, input: CreateQuiz) -> DbResult<Quiz>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Quiz>>;
    /// Matching quizzes, newest first.
    async fn list(&self, filter: CourseworkFilter) -> DbResult<Vec<Quiz>>;
    async fn update(&self, id: Uuid, input: UpdateQuiz) -> DbResult<Quiz>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
    async fn count(&self) -> DbResult<i64>;
}
