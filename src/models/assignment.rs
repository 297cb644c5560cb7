use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validators::validate_not_blank;

/// A piece of coursework with a deadline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub course_id: Uuid,
    pub created_by: Uuid,
    pub due_date: DateTime<Utc>,
    pub max_points: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    /// Whether a submission made at `now` would be accepted.
    pub fn accepts_submissions_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now <= self.due_date
    }
}

/// Request to create an assignment. The creator is always the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignment {
    #[validate(
        length(min = 5, max = 200, message = "Title must be at least 5 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
    #[validate(
        length(min = 10, max = 10000, message = "Description must be at least 10 characters"),
        custom(function = "validate_not_blank")
    )]
    pub description: String,
    pub course_id: Uuid,
    pub due_date: DateTime<Utc>,
    #[validate(range(min = 0.0, message = "Max points must be a non-negative number"))]
    pub max_points: f64,
    pub is_active: Option<bool>,
}

/// Request to update an assignment. The owning course cannot change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignment {
    #[validate(
        length(min = 5, max = 200, message = "Title must be at least 5 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(
        length(min = 10, max = 10000, message = "Description must be at least 10 characters"),
        custom(function = "validate_not_blank")
    )]
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0))]
    pub max_points: Option<f64>,
    pub is_active: Option<bool>,
}
