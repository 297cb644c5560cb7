use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::{
    authz::{Action, Caller, authorize, ownership},
    db::DbPool,
    models::Certificate,
};

/// Builds completion certificates. Nothing is persisted.
#[derive(Clone)]
pub struct CertificateService {
    db: Arc<DbPool>,
}

impl CertificateService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// The certificate for a completed enrollment. `now` stands in for the
    /// completion date if the enrollment was never stamped.
    pub async fn generate(
        &self,
        caller: &Caller,
        enrollment_id: Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Certificate> {
        let enrollment = ownership::certificate(&self.db, enrollment_id).await?;
        authorize(Some(caller), Action::Read, &enrollment.resource)?;

        let enrollment = enrollment.record;
        if !enrollment.is_complete() {
            return Err(ServiceError::validation("Course not completed"));
        }

        let student = ownership::user(&self.db, enrollment.user_id).await?.record;
        let course = ownership::course(&self.db, enrollment.course_id).await?.record;

        Ok(Certificate {
            enrollment_id: enrollment.id,
            student_name: student.full_name(),
            course_title: course.title,
            completion_date: enrollment.completed_at.unwrap_or(now),
            grade: enrollment.grade,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        authz::AuthzError,
        db::tests::harness::{create_test_db, insert_course, insert_user},
        models::{Role, UpdateEnrollment},
        services::tests::test_services,
    };

    #[tokio::test]
    async fn test_incomplete_course_rejected() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let course = insert_course(services.db(), faculty.id, "Thermodynamics").await;
        let enrollment = services.db().enrollments().create(student.id, course.id).await.unwrap();
        services
            .db()
            .enrollments()
            .update(
                enrollment.id,
                UpdateEnrollment {
                    progress: Some(99.0),
                    grade: None,
                },
            )
            .await
            .unwrap();

        let err = services
            .certificates
            .generate(&Caller::new(student.id, student.role), enrollment.id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg == "Course not completed"));
    }

    #[tokio::test]
    async fn test_completed_course_certificate() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let course = insert_course(services.db(), faculty.id, "Thermodynamics").await;
        let enrollment = services.db().enrollments().create(student.id, course.id).await.unwrap();
        services
            .db()
            .enrollments()
            .update(
                enrollment.id,
                UpdateEnrollment {
                    progress: Some(100.0),
                    grade: Some(88.0),
                },
            )
            .await
            .unwrap();
        let completed = services.db().enrollments().get_by_id(enrollment.id).await.unwrap().unwrap();

        let certificate = services
            .certificates
            .generate(&Caller::new(student.id, student.role), enrollment.id, Utc::now())
            .await
            .unwrap();
        assert_eq!(certificate.enrollment_id, enrollment.id);
        assert_eq!(certificate.student_name, "Test User");
        assert_eq!(certificate.course_title, "Thermodynamics");
        assert_eq!(Some(certificate.completion_date), completed.completed_at);
        assert_eq!(certificate.grade, Some(88.0));

        // Generating is read-only.
        let after = services.db().enrollments().get_by_id(enrollment.id).await.unwrap().unwrap();
        assert_eq!(after.updated_at, completed.updated_at);
    }

    #[tokio::test]
    async fn test_other_student_cannot_generate() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let peer = insert_user(services.db(), "peer@example.com", Role::Student).await;
        let course = insert_course(services.db(), faculty.id, "Thermodynamics").await;
        let enrollment = services.db().enrollments().create(student.id, course.id).await.unwrap();

        let err = services
            .certificates
            .generate(&Caller::new(peer.id, peer.role), enrollment.id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::Forbidden(_))));
    }
}
