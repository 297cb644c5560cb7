//! Resolve a record and its [`Resource`] descriptor from the store.
//!
//! Each resolver loads the target and walks its ownership chain
//! (submission to assignment creator, result to quiz creator, enrollment to
//! course instructor). A missing link anywhere in the chain is a not-found
//! error, so callers learn about existence before any permission check.

use thiserror::Error;
use uuid::Uuid;

use super::Resource;
use crate::{
    db::{DbError, DbPool},
    models::{Assignment, Course, Enrollment, Quiz, QuizResult, Submission, User},
};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// A loaded record together with the descriptor its access rules need.
#[derive(Debug, Clone)]
pub struct Owned<T> {
    pub record: T,
    pub resource: Resource,
}

impl<T> Owned<T> {
    fn new(record: T, resource: Resource) -> Self {
        Self { record, resource }
    }
}

pub async fn user(db: &DbPool, id: Uuid) -> Result<Owned<User>, ResolveError> {
    let user = db
        .users()
        .get_by_id(id)
        .await?
        .ok_or(ResolveError::NotFound("User"))?;
    Ok(Owned::new(user, Resource::User { id }))
}

pub async fn course(db: &DbPool, id: Uuid) -> Result<Owned<Course>, ResolveError> {
    let course = find_course(db, id).await?;
    let resource = Resource::Course {
        instructor_id: course.instructor_id,
    };
    Ok(Owned::new(course, resource))
}

pub async fn enrollment(db: &DbPool, id: Uuid) -> Result<Owned<Enrollment>, ResolveError> {
    let enrollment = db
        .enrollments()
        .get_by_id(id)
        .await?
        .ok_or(ResolveError::NotFound("Enrollment"))?;
    let course = find_course(db, enrollment.course_id).await?;
    let resource = Resource::Enrollment {
        user_id: enrollment.user_id,
        course_instructor_id: course.instructor_id,
    };
    Ok(Owned::new(enrollment, resource))
}

/// The enrollment a certificate would be issued for.
pub async fn certificate(db: &DbPool, enrollment_id: Uuid) -> Result<Owned<Enrollment>, ResolveError> {
    let enrollment = db
        .enrollments()
        .get_by_id(enrollment_id)
        .await?
        .ok_or(ResolveError::NotFound("Enrollment"))?;
    let resource = Resource::Certificate {
        user_id: enrollment.user_id,
    };
    Ok(Owned::new(enrollment, resource))
}

pub async fn assignment(db: &DbPool, id: Uuid) -> Result<Owned<Assignment>, ResolveError> {
    let assignment = find_assignment(db, id).await?;
    let resource = Resource::Assignment {
        created_by: assignment.created_by,
    };
    Ok(Owned::new(assignment, resource))
}

/// An assignment as the parent of its submissions.
pub async fn assignment_submissions(
    db: &DbPool,
    id: Uuid,
) -> Result<Owned<Assignment>, ResolveError> {
    let assignment = find_assignment(db, id).await?;
    let resource = Resource::AssignmentSubmissions {
        assignment_created_by: assignment.created_by,
    };
    Ok(Owned::new(assignment, resource))
}

pub async fn submission(db: &DbPool, id: Uuid) -> Result<Owned<Submission>, ResolveError> {
    let submission = db
        .submissions()
        .get_by_id(id)
        .await?
        .ok_or(ResolveError::NotFound("Submission"))?;
    let assignment = find_assignment(db, submission.assignment_id).await?;
    let resource = Resource::Submission {
        user_id: submission.user_id,
        assignment_created_by: assignment.created_by,
    };
    Ok(Owned::new(submission, resource))
}

pub async fn quiz(db: &DbPool, id: Uuid) -> Result<Owned<Quiz>, ResolveError> {
    let quiz = find_quiz(db, id).await?;
    let resource = Resource::Quiz {
        created_by: quiz.created_by,
    };
    Ok(Owned::new(quiz, resource))
}

/// A quiz as the parent of its results.
pub async fn quiz_results(db: &DbPool, id: Uuid) -> Result<Owned<Quiz>, ResolveError> {
    let quiz = find_quiz(db, id).await?;
    let resource = Resource::QuizResults {
        quiz_created_by: quiz.created_by,
    };
    Ok(Owned::new(quiz, resource))
}

pub async fn result(db: &DbPool, id: Uuid) -> Result<Owned<QuizResult>, ResolveError> {
    let result = db
        .results()
        .get_by_id(id)
        .await?
        .ok_or(ResolveError::NotFound("Result"))?;
    let quiz = find_quiz(db, result.quiz_id).await?;
    let resource = Resource::QuizResult {
        user_id: result.user_id,
        quiz_created_by: quiz.created_by,
    };
    Ok(Owned::new(result, resource))
}

/// A course as the target of attendance marking and reporting.
pub async fn course_attendance(db: &DbPool, id: Uuid) -> Result<Owned<Course>, ResolveError> {
    let course = find_course(db, id).await?;
    let resource = Resource::CourseAttendance {
        instructor_id: course.instructor_id,
    };
    Ok(Owned::new(course, resource))
}

async fn find_course(db: &DbPool, id: Uuid) -> Result<Course, ResolveError> {
    db.courses()
        .get_by_id(id)
        .await?
        .ok_or(ResolveError::NotFound("Course"))
}

async fn find_assignment(db: &DbPool, id: Uuid) -> Result<Assignment, ResolveError> {
    db.assignments()
        .get_by_id(id)
        .await?
        .ok_or(ResolveError::NotFound("Assignment"))
}

async fn find_quiz(db: &DbPool, id: Uuid) -> Result<Quiz, ResolveError> {
    db.quizzes()
        .get_by_id(id)
        .await?
        .ok_or(ResolveError::NotFound("Quiz"))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{
        db::tests::harness::{create_test_db, insert_course, insert_user},
        models::{CreateAssignment, CreateSubmission, Role},
    };

    #[tokio::test]
    async fn test_submission_resolves_assignment_creator() {
        let db = create_test_db().await;
        let instructor = insert_user(&db, "prof@example.com", Role::Faculty).await;
        let student = insert_user(&db, "stu@example.com", Role::Student).await;
        let course = insert_course(&db, instructor.id, "Compilers").await;
        let assignment = db
            .assignments()
            .create(
                instructor.id,
                CreateAssignment {
                    title: "Lexer".to_string(),
                    description: "Write a lexer.".to_string(),
                    course_id: course.id,
                    due_date: Utc::now() + Duration::days(1),
                    max_points: 10.0,
                    is_active: None,
                },
            )
            .await
            .unwrap();
        let created = db
            .submissions()
            .create(
                student.id,
                CreateSubmission {
                    assignment_id: assignment.id,
                    content: Some("fn lex()".to_string()),
                    file_path: None,
                },
            )
            .await
            .unwrap();

        let owned = submission(&db, created.id).await.unwrap();
        assert_eq!(owned.record.id, created.id);
        assert_eq!(
            owned.resource,
            Resource::Submission {
                user_id: student.id,
                assignment_created_by: instructor.id,
            }
        );
    }

    #[tokio::test]
    async fn test_enrollment_resolves_course_instructor() {
        let db = create_test_db().await;
        let instructor = insert_user(&db, "prof@example.com", Role::Faculty).await;
        let student = insert_user(&db, "stu@example.com", Role::Student).await;
        let course = insert_course(&db, instructor.id, "Compilers").await;
        let created = db.enrollments().create(student.id, course.id).await.unwrap();

        let owned = enrollment(&db, created.id).await.unwrap();
        assert_eq!(
            owned.resource,
            Resource::Enrollment {
                user_id: student.id,
                course_instructor_id: instructor.id,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let db = create_test_db().await;
        let id = Uuid::new_v4();

        assert!(matches!(
            course(&db, id).await,
            Err(ResolveError::NotFound("Course"))
        ));
        assert!(matches!(
            submission(&db, id).await,
            Err(ResolveError::NotFound("Submission"))
        ));
        assert!(matches!(
            result(&db, id).await,
            Err(ResolveError::NotFound("Result"))
        ));
        let err = enrollment(&db, id).await.unwrap_err();
        assert_eq!(err.to_string(), "Enrollment not found");
    }
}
