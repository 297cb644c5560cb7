use async_trait::async_trait;
use uuid::Uuid;

use super::{Page, PageParams};
use crate::{
    db::error::DbResult,
    models::{Course, CourseFilter, CourseSummary, CreateCourse, GroupCount, UpdateCourse},
};

#[async_trait]
pub trait CourseRepo: Send + Sync {
    async fn create(&self, instructor_id: Uuid, input: CreateCourse) -> DbResult<Course>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Course>>;
    async fn get_summaries(&self, ids: &[Uuid]) -> DbResult<Vec<CourseSummary>>;
    /// Active courses matching the filter, newest first.
    async fn list_active(&self, filter: &CourseFilter, params: PageParams)
    -> DbResult<Page<Course>>;
    async fn list_by_instructor(&self, instructor_id: Uuid) -> DbResult<Vec<Course>>;
    /// Courses the user holds an active enrollment in.
    async fn list_by_student(&self, user_id: Uuid) -> DbResult<Vec<Course>>;
    async fn update(&self, id: Uuid, input: UpdateCourse) -> DbResult<Course>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
    async fn count(&self) -> DbResult<i64>;
    async fn count_by_category(&self) -> DbResult<Vec<GroupCount>>;
}
