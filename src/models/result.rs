use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One submitted answer: which question, and which option was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_index: usize,
    pub selected_answer: String,
}

/// A graded quiz attempt. At most one exists per (quiz, user).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub answers: Vec<QuizAnswer>,
    pub score: u32,
    pub percentage: f64,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to submit a quiz. Any client-supplied score is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuiz {
    pub quiz_id: Uuid,
    #[validate(length(max = 1000))]
    pub answers: Vec<QuizAnswer>,
}

/// A scored attempt ready for insertion.
#[derive(Debug, Clone)]
pub struct NewQuizResult {
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub answers: Vec<QuizAnswer>,
    pub score: u32,
    pub percentage: f64,
}
