//! Server-side quiz scoring. Client-supplied scores are never trusted.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{QuizAnswer, QuizQuestion};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Number of answers matching the question's correct answer.
    pub score: u32,
    /// `100 * score / questions`, unrounded.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Quiz has no questions")]
    NoQuestions,

    #[error("Answer refers to question {index}, but the quiz has {count} questions")]
    QuestionOutOfRange { index: usize, count: usize },

    #[error("Question {index} is answered more than once")]
    DuplicateAnswer { index: usize },
}

/// Score a set of answers against a quiz's questions.
///
/// Answers are compared to the correct answer exactly: case-sensitive and
/// without trimming. Unanswered questions count as wrong. An answer naming
/// a question the quiz does not have rejects the whole submission.
pub fn score_answers(
    questions: &[QuizQuestion],
    answers: &[QuizAnswer],
) -> Result<Score, ScoringError> {
    if questions.is_empty() {
        return Err(ScoringError::NoQuestions);
    }

    let mut seen = HashSet::with_capacity(answers.len());
    let mut score = 0u32;
    for answer in answers {
        let index = answer.question_index;
        let question = questions
            .get(index)
            .ok_or(ScoringError::QuestionOutOfRange {
                index,
                count: questions.len(),
            })?;
        if !seen.insert(index) {
            return Err(ScoringError::DuplicateAnswer { index });
        }
        if answer.selected_answer == question.correct_answer {
            score += 1;
        }
    }

    Ok(Score {
        score,
        percentage: 100.0 * f64::from(score) / questions.len() as f64,
    })
}
