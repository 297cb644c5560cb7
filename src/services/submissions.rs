use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    ServiceError, ServiceResult,
    populate::{Populated, populate, populate_one},
};
use crate::{
    authz::{Action, Caller, Resource, authorize, ownership},
    db::DbPool,
    models::{CreateSubmission, GradeSubmission, Submission},
};

#[derive(Clone)]
pub struct SubmissionService {
    db: Arc<DbPool>,
}

impl SubmissionService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Submit the caller's answer to an assignment.
    ///
    /// The assignment must be active and `now` must not be past its due
    /// date. Each student submits at most once.
    pub async fn submit(
        &self,
        caller: &Caller,
        input: CreateSubmission,
        now: DateTime<Utc>,
    ) -> ServiceResult<Submission> {
        let assignment = ownership::assignment(&self.db, input.assignment_id).await?;
        authorize(Some(caller), Action::Create, &Resource::OwnRecords)?;

        let assignment = assignment.record;
        if !assignment.is_active {
            return Err(ServiceError::validation("Assignment is not active"));
        }
        if !assignment.accepts_submissions_at(now) {
            return Err(ServiceError::validation("Assignment deadline has passed"));
        }
        if self
            .db
            .submissions()
            .find(assignment.id, caller.id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "Assignment already submitted".to_string(),
            ));
        }

        let submission = self.db.submissions().create(caller.id, input).await?;
        tracing::info!(
            submission_id = %submission.id,
            assignment_id = %assignment.id,
            user_id = %caller.id,
            "Assignment submitted"
        );
        Ok(submission)
    }

    pub async fn by_assignment(
        &self,
        caller: &Caller,
        assignment_id: Uuid,
    ) -> ServiceResult<Vec<Populated<Submission>>> {
        let assignment = ownership::assignment_submissions(&self.db, assignment_id).await?;
        authorize(Some(caller), Action::Read, &assignment.resource)?;
        let submissions = self
            .db
            .submissions()
            .list_by_assignment(assignment_id)
            .await?;
        populate(&self.db, submissions).await
    }

    pub async fn mine(&self, caller: &Caller) -> ServiceResult<Vec<Submission>> {
        authorize(Some(caller), Action::Read, &Resource::OwnRecords)?;
        Ok(self.db.submissions().list_by_user(caller.id).await?)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> ServiceResult<Populated<Submission>> {
        let submission = ownership::submission(&self.db, id).await?;
        authorize(Some(caller), Action::Read, &submission.resource)?;
        populate_one(&self.db, submission.record).await
    }

    pub async fn grade(
        &self,
        caller: &Caller,
        id: Uuid,
        input: GradeSubmission,
    ) -> ServiceResult<Populated<Submission>> {
        let submission = ownership::submission(&self.db, id).await?;
        authorize(Some(caller), Action::Update, &submission.resource)?;
        let submission = self.db.submissions().grade(id, input).await?;
        tracing::info!(submission_id = %id, graded_by = %caller.id, "Submission graded");
        populate_one(&self.db, submission).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        authz::AuthzError,
        db::tests::harness::{create_test_db, insert_course, insert_user},
        models::{Assignment, CreateAssignment, Role, User},
        services::{Services, tests::test_services},
    };

    struct Fixture {
        services: Services,
        instructor: User,
        student: User,
        assignment: Assignment,
    }

    async fn fixture(is_active: bool) -> Fixture {
        let services = test_services(create_test_db().await);
        let instructor = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let course = insert_course(services.db(), instructor.id, "Compilers").await;
        let assignment = services
            .db()
            .assignments()
            .create(
                instructor.id,
                CreateAssignment {
                    title: "Parser".to_string(),
                    description: "Write a parser.".to_string(),
                    course_id: course.id,
                    due_date: Utc::now() + Duration::days(1),
                    max_points: 100.0,
                    is_active: Some(is_active),
                },
            )
            .await
            .unwrap();
        Fixture {
            services,
            instructor,
            student,
            assignment,
        }
    }

    fn submission(assignment_id: Uuid) -> CreateSubmission {
        CreateSubmission {
            assignment_id,
            content: Some("fn parse() {}".to_string()),
            file_path: None,
        }
    }

    #[tokio::test]
    async fn test_submit_after_deadline_rejected() {
        let f = fixture(true).await;
        let caller = Caller::new(f.student.id, f.student.role);
        let late = f.assignment.due_date + Duration::seconds(1);

        let err = f
            .services
            .submissions
            .submit(&caller, submission(f.assignment.id), late)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg == "Assignment deadline has passed"));

        // Nothing was stored, so an on-time attempt still succeeds.
        f.services
            .submissions
            .submit(&caller, submission(f.assignment.id), f.assignment.due_date)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_to_inactive_assignment_rejected() {
        let f = fixture(false).await;
        let err = f
            .services
            .submissions
            .submit(
                &Caller::new(f.student.id, f.student.role),
                submission(f.assignment.id),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg == "Assignment is not active"));
    }

    #[tokio::test]
    async fn test_second_submission_conflicts() {
        let f = fixture(true).await;
        let caller = Caller::new(f.student.id, f.student.role);
        f.services
            .submissions
            .submit(&caller, submission(f.assignment.id), Utc::now())
            .await
            .unwrap();

        let err = f
            .services
            .submissions
            .submit(&caller, submission(f.assignment.id), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == "Assignment already submitted"));
    }

    #[tokio::test]
    async fn test_only_assignment_creator_grades() {
        let f = fixture(true).await;
        let other = insert_user(f.services.db(), "other@example.com", Role::Faculty).await;
        let created = f
            .services
            .submissions
            .submit(
                &Caller::new(f.student.id, f.student.role),
                submission(f.assignment.id),
                Utc::now(),
            )
            .await
            .unwrap();
        let grade = || GradeSubmission {
            grade: 91.0,
            feedback: Some("Solid work".to_string()),
        };

        let err = f
            .services
            .submissions
            .grade(&Caller::new(other.id, other.role), created.id, grade())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Authz(AuthzError::Forbidden(msg)) if msg == "Not authorized to grade this submission"
        ));

        let graded = f
            .services
            .submissions
            .grade(&Caller::new(f.instructor.id, f.instructor.role), created.id, grade())
            .await
            .unwrap();
        assert_eq!(graded.record.grade, Some(91.0));
        assert_eq!(graded.refs["user"]["email"], "stu@example.com");
    }

    #[tokio::test]
    async fn test_other_student_cannot_read_submission() {
        let f = fixture(true).await;
        let peer = insert_user(f.services.db(), "peer@example.com", Role::Student).await;
        let created = f
            .services
            .submissions
            .submit(
                &Caller::new(f.student.id, f.student.role),
                submission(f.assignment.id),
                Utc::now(),
            )
            .await
            .unwrap();

        let err = f
            .services
            .submissions
            .get(&Caller::new(peer.id, peer.role), created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::Forbidden(_))));

        let own = f
            .services
            .submissions
            .get(&Caller::new(f.student.id, f.student.role), created.id)
            .await
            .unwrap();
        assert_eq!(own.record.id, created.id);
    }
}
