use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Whether a student attended a course on a given day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub date: NaiveDate,
    pub present: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One student's mark within a [`MarkAttendance`] request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub student_id: Uuid,
    pub present: bool,
}

/// Request to mark attendance for several students on one day.
/// Re-marking a student on the same day overwrites `present`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    pub course_id: Uuid,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 1000, message = "At least one attendance record is required"))]
    pub attendance_records: Vec<AttendanceMark>,
}

/// Optional filters on attendance lookups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFilter {
    pub course_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(records: Vec<AttendanceMark>) -> MarkAttendance {
        MarkAttendance {
            course_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            attendance_records: records,
        }
    }

    #[test]
    fn test_empty_attendance_records_rejected() {
        let err = mark(vec![]).validate().unwrap_err();
        assert!(
            err.to_string()
                .contains("At least one attendance record is required"),
            "{err}"
        );
    }

    #[test]
    fn test_single_attendance_record_accepted() {
        let input = mark(vec![AttendanceMark {
            student_id: Uuid::new_v4(),
            present: true,
        }]);
        assert!(input.validate().is_ok());
    }
}
