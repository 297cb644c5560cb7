use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{db::error::DbResult, models::Attendance};

#[async_trait]
pub trait AttendanceRepo: Send + Sync {
    /// Insert or overwrite the record for (user, course, date).
    async fn upsert(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        date: NaiveDate,
        present: bool,
    ) -> DbResult<Attendance>;
    async fn list_by_course(
        &self,
        course_id: Uuid,
        date: Option<NaiveDate>,
    ) -> DbResult<Vec<Attendance>>;
    async fn list_by_student(
        &self,
        user_id: Uuid,
        course_id: Option<Uuid>,
    ) -> DbResult<Vec<Attendance>>;
    async fn list_by_date(
        &self,
        date: NaiveDate,
        course_id: Option<Uuid>,
    ) -> DbResult<Vec<Attendance>>;
}
