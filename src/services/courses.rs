use std::sync::Arc;

use uuid::Uuid;

use super::{
    ServiceResult,
    populate::{Populated, populate, populate_one, populate_page},
};
use crate::{
    authz::{Action, Caller, Resource, authorize, ownership},
    db::{DbPool, Page, PageParams},
    models::{Course, CourseFilter, CreateCourse, Role, UpdateCourse},
};

/// The course catalog. Reads are public; mutations belong to the instructor.
#[derive(Clone)]
pub struct CourseService {
    db: Arc<DbPool>,
}

impl CourseService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Active courses, newest first, with their instructor.
    pub async fn list(
        &self,
        caller: Option<&Caller>,
        filter: CourseFilter,
        params: PageParams,
    ) -> ServiceResult<Page<Populated<Course>>> {
        authorize(caller, Action::Read, &Resource::CourseCatalog)?;
        let page = self.db.courses().list_active(&filter, params).await?;
        populate_page(&self.db, page).await
    }

    pub async fn by_category(
        &self,
        caller: Option<&Caller>,
        category: String,
        params: PageParams,
    ) -> ServiceResult<Page<Populated<Course>>> {
        let filter = CourseFilter {
            category: Some(category),
            search: None,
        };
        self.list(caller, filter, params).await
    }

    pub async fn get(&self, caller: Option<&Caller>, id: Uuid) -> ServiceResult<Populated<Course>> {
        let course = ownership::course(&self.db, id).await?;
        authorize(caller, Action::Read, &course.resource)?;
        populate_one(&self.db, course.record).await
    }

    /// Students get the courses they are enrolled in; everyone else gets the
    /// courses they teach.
    pub async fn my_courses(&self, caller: &Caller) -> ServiceResult<Vec<Populated<Course>>> {
        let courses = match caller.role {
            Role::Student => self.db.courses().list_by_student(caller.id).await?,
            Role::Faculty | Role::Admin => self.db.courses().list_by_instructor(caller.id).await?,
        };
        populate(&self.db, courses).await
    }

    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateCourse,
    ) -> ServiceResult<Populated<Course>> {
        authorize(Some(caller), Action::Create, &Resource::CourseCatalog)?;
        let course = self.db.courses().create(caller.id, input).await?;
        tracing::info!(course_id = %course.id, instructor_id = %caller.id, "Course created");
        populate_one(&self.db, course).await
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        input: UpdateCourse,
    ) -> ServiceResult<Populated<Course>> {
        let course = ownership::course(&self.db, id).await?;
        authorize(Some(caller), Action::Update, &course.resource)?;
        let course = self.db.courses().update(id, input).await?;
        populate_one(&self.db, course).await
    }

    /// Delete a course together with its enrollments, coursework and
    /// attendance.
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> ServiceResult<()> {
        let course = ownership::course(&self.db, id).await?;
        authorize(Some(caller), Action::Delete, &course.resource)?;
        self.db.courses().delete(id).await?;
        tracing::info!(course_id = %id, deleted_by = %caller.id, "Course deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        authz::AuthzError,
        db::tests::harness::{course_input, create_test_db, insert_course, insert_user},
        services::{ServiceError, tests::test_services},
    };

    #[tokio::test]
    async fn test_only_instructor_or_admin_mutates() {
        let services = test_services(create_test_db().await);
        let owner = insert_user(services.db(), "owner@example.com", Role::Faculty).await;
        let other = insert_user(services.db(), "other@example.com", Role::Faculty).await;
        let admin = insert_user(services.db(), "admin@example.com", Role::Admin).await;
        let course = insert_course(services.db(), owner.id, "Linear Algebra").await;

        let update = || UpdateCourse {
            title: Some("Linear Algebra II".to_string()),
            ..Default::default()
        };

        let err = services
            .courses
            .update(&Caller::new(other.id, other.role), course.id, update())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Authz(AuthzError::Forbidden(msg)) if msg == "Not authorized to update this course"
        ));

        let updated = services
            .courses
            .update(&Caller::new(admin.id, admin.role), course.id, update())
            .await
            .unwrap();
        assert_eq!(updated.record.title, "Linear Algebra II");
        assert_eq!(updated.refs["instructor"]["email"], "owner@example.com");
    }

    #[tokio::test]
    async fn test_student_cannot_create_course() {
        let services = test_services(create_test_db().await);
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;

        let err = services
            .courses
            .create(
                &Caller::new(student.id, student.role),
                course_input("Rust for Students", "Programming"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_my_courses_depends_on_role() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let taught = insert_course(services.db(), faculty.id, "Type Theory").await;
        insert_course(services.db(), faculty.id, "Category Theory").await;
        services
            .db()
            .enrollments()
            .create(student.id, taught.id)
            .await
            .unwrap();

        let teaching = services
            .courses
            .my_courses(&Caller::new(faculty.id, faculty.role))
            .await
            .unwrap();
        assert_eq!(teaching.len(), 2);

        let enrolled = services
            .courses
            .my_courses(&Caller::new(student.id, student.role))
            .await
            .unwrap();
        assert_eq!(enrolled.len(), 1);
        assert_eq!(enrolled[0].record.id, taught.id);
    }

    #[tokio::test]
    async fn test_anonymous_can_read_catalog() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let course = insert_course(services.db(), faculty.id, "Number Theory").await;

        let page = services
            .courses
            .list(None, CourseFilter::default(), PageParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let fetched = services.courses.get(None, course.id).await.unwrap();
        assert_eq!(fetched.record.id, course.id);
    }
}
