use std::sync::Arc;

use uuid::Uuid;

use super::{
    ServiceResult,
    populate::{Populated, populate, populate_one},
};
use crate::{
    authz::{Action, Caller, ListScope, Resource, authorize, list_scope, ownership},
    db::{CourseworkFilter, DbPool},
    models::{Assignment, CreateAssignment, UpdateAssignment},
};

#[derive(Clone)]
pub struct AssignmentService {
    db: Arc<DbPool>,
}

impl AssignmentService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// All assignments visible to the caller. Students see active ones only.
    pub async fn list(&self, caller: &Caller) -> ServiceResult<Vec<Populated<Assignment>>> {
        self.list_filtered(caller, None).await
    }

    pub async fn by_course(
        &self,
        caller: &Caller,
        course_id: Uuid,
    ) -> ServiceResult<Vec<Populated<Assignment>>> {
        ownership::course(&self.db, course_id).await?;
        self.list_filtered(caller, Some(course_id)).await
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> ServiceResult<Populated<Assignment>> {
        let assignment = ownership::assignment(&self.db, id).await?;
        authorize(Some(caller), Action::Read, &assignment.resource)?;
        populate_one(&self.db, assignment.record).await
    }

    /// Create an assignment in a course the caller teaches.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateAssignment,
    ) -> ServiceResult<Populated<Assignment>> {
        let course = ownership::course(&self.db, input.course_id).await?;
        authorize(
            Some(caller),
            Action::Create,
            &Resource::NewAssignment {
                course_instructor_id: course.record.instructor_id,
            },
        )?;

        let assignment = self.db.assignments().create(caller.id, input).await?;
        tracing::info!(
            assignment_id = %assignment.id,
            course_id = %assignment.course_id,
            "Assignment created"
        );
        populate_one(&self.db, assignment).await
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        input: UpdateAssignment,
    ) -> ServiceResult<Populated<Assignment>> {
        let assignment = ownership::assignment(&self.db, id).await?;
        authorize(Some(caller), Action::Update, &assignment.resource)?;
        let assignment = self.db.assignments().update(id, input).await?;
        populate_one(&self.db, assignment).await
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> ServiceResult<()> {
        let assignment = ownership::assignment(&self.db, id).await?;
        authorize(Some(caller), Action::Delete, &assignment.resource)?;
        self.db.assignments().delete(id).await?;
        tracing::info!(assignment_id = %id, deleted_by = %caller.id, "Assignment deleted");
        Ok(())
    }

    async fn list_filtered(
        &self,
        caller: &Caller,
        course_id: Option<Uuid>,
    ) -> ServiceResult<Vec<Populated<Assignment>>> {
        authorize(Some(caller), Action::Read, &Resource::CourseworkCatalog)?;
        let filter = CourseworkFilter {
            course_id,
            active_only: list_scope(caller) == ListScope::ActiveOnly,
        };
        let assignments = self.db.assignments().list(filter).await?;
        populate(&self.db, assignments).await
    }
}
