use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validators::validate_not_blank;

/// A course taught by a single instructor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub instructor_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields of a course embedded in other records' responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
        }
    }
}

/// Request to create a course. The instructor is always the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    #[validate(length(min = 5, max = 200, message = "Title must be at least 5 characters"))]
    pub title: String,
    #[validate(length(
        min = 10,
        max = 10000,
        message = "Description must be at least 10 characters"
    ))]
    pub description: String,
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub category: String,
    #[validate(length(max = 2048))]
    pub thumbnail: Option<String>,
    pub is_active: Option<bool>,
}

/// Request to update a course.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse {
    #[validate(length(min = 5, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 10, max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub category: Option<String>,
    #[validate(length(max = 2048))]
    pub thumbnail: Option<String>,
    pub is_active: Option<bool>,
}

/// Query filters for the public course catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    pub category: Option<String>,
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
}
