use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A student's registration in a course.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    /// Completion percentage in [0, 100].
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    pub enrolled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }
}

/// Request to enroll the caller in a course.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollment {
    pub course_id: Uuid,
}

/// Request to update progress or grade.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollment {
    #[validate(range(min = 0.0, max = 100.0, message = "Progress must be between 0 and 100"))]
    pub progress: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "Grade must be between 0 and 100"))]
    pub grade: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_enrollment_bounds() {
        let ok = UpdateEnrollment {
            progress: Some(100.0),
            grade: Some(0.0),
        };
        assert!(ok.validate().is_ok());

        let over = UpdateEnrollment {
            progress: Some(100.1),
            grade: None,
        };
        assert!(over.validate().is_err());

        let negative = UpdateEnrollment {
            progress: None,
            grade: Some(-1.0),
        };
        assert!(negative.validate().is_err());
    }
}
