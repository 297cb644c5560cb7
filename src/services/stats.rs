use std::sync::Arc;

use super::ServiceResult;
use crate::{
    authz::{Action, Caller, Resource, authorize},
    db::DbPool,
    models::Stats,
};

/// Administrative totals.
#[derive(Clone)]
pub struct StatsService {
    db: Arc<DbPool>,
}

impl StatsService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn overview(&self, caller: &Caller) -> ServiceResult<Stats> {
        authorize(Some(caller), Action::Read, &Resource::Statistics)?;

        Ok(Stats {
            total_users: self.db.users().count().await?,
            total_courses: self.db.courses().count().await?,
            total_enrollments: self.db.enrollments().count().await?,
            total_assignments: self.db.assignments().count().await?,
            total_quizzes: self.db.quizzes().count().await?,
            users_by_role: self.db.users().count_by_role().await?,
            courses_by_category: self.db.courses().count_by_category().await?,
        })
    }
}
