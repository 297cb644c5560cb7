use std::sync::Arc;

use uuid::Uuid;

use super::{
    ServiceError, ServiceResult,
    populate::{Populated, populate, populate_one},
};
use crate::{
    authz::{Action, Caller, Resource, authorize, ownership},
    db::DbPool,
    models::{CreateEnrollment, Enrollment, UpdateEnrollment},
};

#[derive(Clone)]
pub struct EnrollmentService {
    db: Arc<DbPool>,
}

impl EnrollmentService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Enroll the caller. The student is always the caller, never a field
    /// of the request.
    pub async fn enroll(
        &self,
        caller: &Caller,
        input: CreateEnrollment,
    ) -> ServiceResult<Populated<Enrollment>> {
        let course = ownership::course(&self.db, input.course_id).await?;
        authorize(Some(caller), Action::Create, &Resource::OwnRecords)?;
        if !course.record.is_active {
            return Err(ServiceError::validation("Course is not active"));
        }

        // The unique index catches the concurrent case; this gives the same
        // answer without a failed insert.
        if self
            .db
            .enrollments()
            .find_active(caller.id, course.record.id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "Already enrolled in this course".to_string(),
            ));
        }

        let enrollment = self
            .db
            .enrollments()
            .create(caller.id, course.record.id)
            .await?;
        tracing::info!(
            enrollment_id = %enrollment.id,
            user_id = %caller.id,
            course_id = %course.record.id,
            "Enrolled in course"
        );
        populate_one(&self.db, enrollment).await
    }

    pub async fn mine(&self, caller: &Caller) -> ServiceResult<Vec<Populated<Enrollment>>> {
        authorize(Some(caller), Action::Read, &Resource::OwnRecords)?;
        let enrollments = self.db.enrollments().list_by_user(caller.id).await?;
        populate(&self.db, enrollments).await
    }

    pub async fn by_course(
        &self,
        caller: &Caller,
        course_id: Uuid,
    ) -> ServiceResult<Vec<Populated<Enrollment>>> {
        ownership::course(&self.db, course_id).await?;
        authorize(Some(caller), Action::Read, &Resource::EnrollmentRoster)?;
        let enrollments = self.db.enrollments().list_by_course(course_id).await?;
        populate(&self.db, enrollments).await
    }

    pub async fn by_user(
        &self,
        caller: &Caller,
        user_id: Uuid,
    ) -> ServiceResult<Vec<Populated<Enrollment>>> {
        ownership::user(&self.db, user_id).await?;
        authorize(Some(caller), Action::Read, &Resource::EnrollmentRoster)?;
        let enrollments = self.db.enrollments().list_by_user(user_id).await?;
        populate(&self.db, enrollments).await
    }

    /// Update progress or grade. Reaching 100% progress stamps the
    /// completion time.
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        input: UpdateEnrollment,
    ) -> ServiceResult<Populated<Enrollment>> {
        let enrollment = ownership::enrollment(&self.db, id).await?;
        authorize(Some(caller), Action::Update, &enrollment.resource)?;
        let enrollment = self.db.enrollments().update(id, input).await?;
        populate_one(&self.db, enrollment).await
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> ServiceResult<()> {
        let enrollment = ownership::enrollment(&self.db, id).await?;
        authorize(Some(caller), Action::Delete, &enrollment.resource)?;
        self.db.enrollments().delete(id).await?;
        tracing::info!(enrollment_id = %id, user_id = %caller.id, "Unenrolled from course");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        authz::AuthzError,
        db::tests::harness::{create_test_db, insert_course, insert_user},
        models::{Role, UpdateCourse},
        services::tests::test_services,
    };

    #[tokio::test]
    async fn test_second_enrollment_conflicts() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let course = insert_course(services.db(), faculty.id, "Databases").await;
        let caller = Caller::new(student.id, student.role);
        let input = CreateEnrollment {
            course_id: course.id,
        };

        let enrollment = services.enrollments.enroll(&caller, input.clone()).await.unwrap();
        assert_eq!(enrollment.record.user_id, student.id);
        assert_eq!(enrollment.refs["course"]["title"], "Databases");

        let err = services.enrollments.enroll(&caller, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == "Already enrolled in this course"));
    }

    #[tokio::test]
    async fn test_enroll_in_missing_or_inactive_course() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let caller = Caller::new(student.id, student.role);

        let err = services
            .enrollments
            .enroll(&caller, CreateEnrollment { course_id: Uuid::new_v4() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg == "Course not found"));

        let course = insert_course(services.db(), faculty.id, "Archived Course").await;
        services
            .db()
            .courses()
            .update(
                course.id,
                UpdateCourse {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let err = services
            .enrollments
            .enroll(&caller, CreateEnrollment { course_id: course.id })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_faculty_updates_only_own_course_enrollments() {
        let services = test_services(create_test_db().await);
        let instructor = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let course = insert_course(services.db(), instructor.id, "Compilers").await;
        let enrollment = services
            .db()
            .enrollments()
            .create(student.id, course.id)
            .await
            .unwrap();

        let err = services
            .enrollments
            .update(
                &Caller::new(instructor.id, instructor.role),
                enrollment.id,
                UpdateEnrollment {
                    progress: Some(50.0),
                    grade: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::Forbidden(_))));

        let updated = services
            .enrollments
            .update(
                &Caller::new(student.id, student.role),
                enrollment.id,
                UpdateEnrollment {
                    progress: Some(100.0),
                    grade: None,
                },
            )
            .await
            .unwrap();
        assert!(updated.record.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_roster_requires_faculty() {
        let services = test_services(create_test_db().await);
        let instructor = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let course = insert_course(services.db(), instructor.id, "Compilers").await;
        services.db().enrollments().create(student.id, course.id).await.unwrap();

        let err = services
            .enrollments
            .by_course(&Caller::new(student.id, student.role), course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::Forbidden(_))));

        let roster = services
            .enrollments
            .by_course(&Caller::new(instructor.id, instructor.role), course.id)
            .await
            .unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].refs["user"]["email"], "stu@example.com");
    }
}
