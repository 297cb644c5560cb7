use std::sync::Arc;

use uuid::Uuid;

use super::{
    ServiceError, ServiceResult,
    populate::{Populated, populate, populate_one},
    scoring::score_answers,
};
use crate::{
    authz::{Action, Caller, Resource, authorize, ownership},
    db::DbPool,
    models::{NewQuizResult, QuizResult, SubmitQuiz},
};

#[derive(Clone)]
pub struct ResultService {
    db: Arc<DbPool>,
}

impl ResultService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Score and store the caller's attempt at a quiz. One attempt per quiz.
    pub async fn submit(&self, caller: &Caller, input: SubmitQuiz) -> ServiceResult<QuizResult> {
        let quiz = ownership::quiz(&self.db, input.quiz_id).await?;
        authorize(Some(caller), Action::Create, &Resource::OwnRecords)?;

        let quiz = quiz.record;
        if !quiz.is_active {
            return Err(ServiceError::validation("Quiz is not active"));
        }
        if self.db.results().find(quiz.id, caller.id).await?.is_some() {
            return Err(ServiceError::Conflict("Quiz already taken".to_string()));
        }

        let score = score_answers(&quiz.questions, &input.answers)
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let result = self
            .db
            .results()
            .create(NewQuizResult {
                quiz_id: quiz.id,
                user_id: caller.id,
                answers: input.answers,
                score: score.score,
                percentage: score.percentage,
            })
            .await?;
        tracing::info!(
            result_id = %result.id,
            quiz_id = %quiz.id,
            user_id = %caller.id,
            score = result.score,
            "Quiz submitted"
        );
        Ok(result)
    }

    pub async fn by_quiz(
        &self,
        caller: &Caller,
        quiz_id: Uuid,
    ) -> ServiceResult<Vec<Populated<QuizResult>>> {
        let quiz = ownership::quiz_results(&self.db, quiz_id).await?;
        authorize(Some(caller), Action::Read, &quiz.resource)?;
        let results = self.db.results().list_by_quiz(quiz_id).await?;
        populate(&self.db, results).await
    }

    pub async fn by_user(&self, caller: &Caller, user_id: Uuid) -> ServiceResult<Vec<QuizResult>> {
        ownership::user(&self.db, user_id).await?;
        authorize(Some(caller), Action::Read, &Resource::UserResults { user_id })?;
        Ok(self.db.results().list_by_user(user_id).await?)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> ServiceResult<Populated<QuizResult>> {
        let result = ownership::result(&self.db, id).await?;
        authorize(Some(caller), Action::Read, &result.resource)?;
        populate_one(&self.db, result.record).await
    }
}
