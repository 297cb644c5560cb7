use std::sync::Arc;

use uuid::Uuid;

use super::{
    ServiceResult,
    populate::{Populated, populate, populate_one},
};
use crate::{
    authz::{Action, Caller, ListScope, Resource, authorize, list_scope, ownership},
    db::{CourseworkFilter, DbPool},
    models::{CreateQuiz, Quiz, UpdateQuiz},
};

#[derive(Clone)]
pub struct QuizService {
    db: Arc<DbPool>,
}

impl QuizService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// All quizzes visible to the caller. Students see active ones only.
    pub async fn list(&self, caller: &Caller) -> ServiceResult<Vec<Populated<Quiz>>> {
        self.list_filtered(caller, None).await
    }

    pub async fn by_course(
        &self,
        caller: &Caller,
        course_id: Uuid,
    ) -> ServiceResult<Vec<Populated<Quiz>>> {
        ownership::course(&self.db, course_id).await?;
        self.list_filtered(caller, Some(course_id)).await
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> ServiceResult<Populated<Quiz>> {
        let quiz = ownership::quiz(&self.db, id).await?;
        authorize(Some(caller), Action::Read, &quiz.resource)?;
        populate_one(&self.db, quiz.record).await
    }

    /// Create a quiz in a course the caller teaches.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateQuiz,
    ) -> ServiceResult<Populated<Quiz>> {
        let course = ownership::course(&self.db, input.course_id).await?;
        authorize(
            Some(caller),
            Action::Create,
            &Resource::NewQuiz {
                course_instructor_id: course.record.instructor_id,
            },
        )?;

        let quiz = self.db.quizzes().create(caller.id, input).await?;
        tracing::info!(
            quiz_id = %quiz.id,
            course_id = %quiz.course_id,
            "Quiz created"
        );
        populate_one(&self.db, quiz).await
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        input: UpdateQuiz,
    ) -> ServiceResult<Populated<Quiz>> {
        let quiz = ownership::quiz(&self.db, id).await?;
        authorize(Some(caller), Action::Update, &quiz.resource)?;
        let quiz = self.db.quizzes().update(id, input).await?;
        populate_one(&self.db, quiz).await
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> ServiceResult<()> {
        let quiz = ownership::quiz(&self.db, id).await?;
        authorize(Some(caller), Action::Delete, &quiz.resource)?;
        self.db.quizzes().delete(id).await?;
        tracing::info!(quiz_id = %id, deleted_by = %caller.id, "Quiz deleted");
        Ok(())
    }

    async fn list_filtered(
        &self,
        caller: &Caller,
        course_id: Option<Uuid>,
    ) -> ServiceResult<Vec<Populated<Quiz>>> {
        authorize(Some(caller), Action::Read, &Resource::CourseworkCatalog)?;
        let filter = CourseworkFilter {
            course_id,
            active_only: list_scope(caller) == ListScope::ActiveOnly,
        };
        let quizzes = self.db.quizzes().list(filter).await?;
        populate(&self.db, quizzes).await
    }
}
