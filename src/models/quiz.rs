use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validators::validate_not_blank;

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[validate(length(max = 2000), custom(function = "validate_not_blank"))]
    pub question: String,
    #[validate(length(min = 2, message = "Each question needs at least 2 options"))]
    pub options: Vec<String>,
    #[validate(length(max = 2000), custom(function = "validate_not_blank"))]
    pub correct_answer: String,
}

/// A timed quiz attached to a course.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub course_id: Uuid,
    pub created_by: Uuid,
    pub questions: Vec<QuizQuestion>,
    pub max_points: f64,
    /// Time limit in minutes.
    pub duration: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a quiz. The creator is always the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuiz {
    #[validate(
        length(min = 5, max = 200, message = "Title must be at least 5 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub course_id: Uuid,
    #[validate(length(min = 1, message = "Quiz must have at least one question"), nested)]
    pub questions: Vec<QuizQuestion>,
    #[validate(range(min = 0.0, message = "Max points must be a non-negative number"))]
    pub max_points: f64,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration: u32,
    pub is_active: Option<bool>,
}

/// Request to update a quiz. Replacing `questions` replaces the whole list.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuiz {
    #[validate(
        length(min = 5, max = 200, message = "Title must be at least 5 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Quiz must have at least one question"), nested)]
    pub questions: Option<Vec<QuizQuestion>>,
    #[validate(range(min = 0.0))]
    pub max_points: Option<f64>,
    #[validate(range(min = 1))]
    pub duration: Option<u32>,
    pub is_active: Option<bool>,
}
