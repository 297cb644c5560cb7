use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Number of records sharing a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

/// Admin dashboard statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_assignments: i64,
    pub total_quizzes: i64,
    pub users_by_role: Vec<GroupCount>,
    pub courses_by_category: Vec<GroupCount>,
}

/// Completion certificate for a finished enrollment. Not persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub enrollment_id: Uuid,
    pub student_name: String,
    pub course_title: String,
    pub completion_date: DateTime<Utc>,
    pub grade: Option<f64>,
}
