use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;
use uuid::Uuid;

use super::{
    ServiceError, ServiceResult,
    populate::{Populated, populate},
};
use crate::{
    authz::{Action, Caller, Resource, authorize, ownership},
    db::DbPool,
    models::{Attendance, MarkAttendance},
};

#[derive(Clone)]
pub struct AttendanceService {
    db: Arc<DbPool>,
}

impl AttendanceService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Record attendance for a course on one day.
    ///
    /// Marking a student again on the same day overwrites the earlier mark.
    /// Every listed student must exist; if any does not, nothing is written.
    pub async fn mark(
        &self,
        caller: &Caller,
        input: MarkAttendance,
    ) -> ServiceResult<Vec<Attendance>> {
        let course = ownership::course_attendance(&self.db, input.course_id).await?;
        authorize(Some(caller), Action::Create, &course.resource)?;

        let student_ids: HashSet<Uuid> = input
            .attendance_records
            .iter()
            .map(|mark| mark.student_id)
            .collect();
        let ids: Vec<Uuid> = student_ids.iter().copied().collect();
        let known = self.db.users().get_summaries(&ids).await?;
        if known.len() != ids.len() {
            let known: HashSet<Uuid> = known.into_iter().map(|user| user.id).collect();
            let missing = ids.iter().find(|id| !known.contains(id));
            tracing::debug!(missing = ?missing, "Attendance references unknown student");
            return Err(ServiceError::not_found("User not found"));
        }

        let mut records = Vec::with_capacity(input.attendance_records.len());
        for mark in input.attendance_records {
            let record = self
                .db
                .attendance()
                .upsert(mark.student_id, course.record.id, input.date, mark.present)
                .await?;
            records.push(record);
        }
        tracing::info!(
            course_id = %course.record.id,
            date = %input.date,
            count = records.len(),
            "Attendance marked"
        );
        Ok(records)
    }

    pub async fn by_course(
        &self,
        caller: &Caller,
        course_id: Uuid,
        date: Option<NaiveDate>,
    ) -> ServiceResult<Vec<Populated<Attendance>>> {
        let course = ownership::course_attendance(&self.db, course_id).await?;
        authorize(Some(caller), Action::Read, &course.resource)?;
        let records = self.db.attendance().list_by_course(course_id, date).await?;
        populate(&self.db, records).await
    }

    pub async fn by_student(
        &self,
        caller: &Caller,
        student_id: Uuid,
        course_id: Option<Uuid>,
    ) -> ServiceResult<Vec<Populated<Attendance>>> {
        ownership::user(&self.db, student_id).await?;
        authorize(
            Some(caller),
            Action::Read,
            &Resource::StudentAttendance { student_id },
        )?;
        let records = self
            .db
            .attendance()
            .list_by_student(student_id, course_id)
            .await?;
        populate(&self.db, records).await
    }

    pub async fn by_date(
        &self,
        caller: &Caller,
        date: NaiveDate,
        course_id: Option<Uuid>,
    ) -> ServiceResult<Vec<Populated<Attendance>>> {
        authorize(Some(caller), Action::Read, &Resource::AttendanceLedger)?;
        let records = self.db.attendance().list_by_date(date, course_id).await?;
        populate(&self.db, records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        authz::AuthzError,
        db::tests::harness::{create_test_db, insert_course, insert_user},
        models::{AttendanceMark, Role},
        services::tests::test_services,
    };

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    fn mark(course_id: Uuid, student_id: Uuid, present: bool) -> MarkAttendance {
        MarkAttendance {
            course_id,
            date: day(),
            attendance_records: vec![AttendanceMark {
                student_id,
                present,
            }],
        }
    }

    #[tokio::test]
    async fn test_remarking_keeps_one_record() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let course = insert_course(services.db(), faculty.id, "Physics").await;
        let prof = Caller::new(faculty.id, faculty.role);

        services
            .attendance
            .mark(&prof, mark(course.id, student.id, true))
            .await
            .unwrap();
        services
            .attendance
            .mark(&prof, mark(course.id, student.id, false))
            .await
            .unwrap();

        let records = services
            .attendance
            .by_course(&prof, course.id, Some(day()))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].record.present);
        assert_eq!(records[0].refs["user"]["email"], "stu@example.com");
    }

    #[tokio::test]
    async fn test_unknown_student_writes_nothing() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let course = insert_course(services.db(), faculty.id, "Physics").await;
        let prof = Caller::new(faculty.id, faculty.role);

        let mut input = mark(course.id, student.id, true);
        input.attendance_records.push(AttendanceMark {
            student_id: Uuid::new_v4(),
            present: true,
        });
        let err = services.attendance.mark(&prof, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg == "User not found"));

        let records = services
            .attendance
            .by_course(&prof, course.id, None)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_other_faculty_cannot_mark() {
        let services = test_services(create_test_db().await);
        let owner = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let other = insert_user(services.db(), "other@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let course = insert_course(services.db(), owner.id, "Physics").await;

        let err = services
            .attendance
            .mark(
                &Caller::new(other.id, other.role),
                mark(course.id, student.id, true),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_student_reads_own_attendance_only() {
        let services = test_services(create_test_db().await);
        let faculty = insert_user(services.db(), "prof@example.com", Role::Faculty).await;
        let student = insert_user(services.db(), "stu@example.com", Role::Student).await;
        let peer = insert_user(services.db(), "peer@example.com", Role::Student).await;
        let course = insert_course(services.db(), faculty.id, "Physics").await;
        services
            .attendance
            .mark(
                &Caller::new(faculty.id, faculty.role),
                mark(course.id, student.id, true),
            )
            .await
            .unwrap();

        let own = services
            .attendance
            .by_student(&Caller::new(student.id, student.role), student.id, None)
            .await
            .unwrap();
        assert_eq!(own.len(), 1);

        let err = services
            .attendance
            .by_student(&Caller::new(peer.id, peer.role), student.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authz(AuthzError::Forbidden(_))));
    }
}
