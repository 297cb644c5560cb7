use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A student's answer to an assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to submit work for an assignment. The submitter is always the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_has_body"))]
pub struct CreateSubmission {
    pub assignment_id: Uuid,
    #[validate(length(max = 100000))]
    pub content: Option<String>,
    #[validate(length(max = 2048))]
    pub file_path: Option<String>,
}

fn validate_has_body(input: &CreateSubmission) -> Result<(), ValidationError> {
    let has = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
    if !has(&input.content) && !has(&input.file_path) {
        let mut err = ValidationError::new("empty_submission");
        err.message = Some(Cow::Borrowed("Submission needs content or a file path"));
        return Err(err);
    }
    Ok(())
}

/// Request to grade a submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GradeSubmission {
    #[validate(range(min = 0.0, max = 100.0, message = "Grade must be between 0 and 100"))]
    pub grade: f64,
    #[validate(length(max = 10000))]
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_requires_content_or_file() {
        let empty = CreateSubmission {
            assignment_id: Uuid::new_v4(),
            content: Some("   ".to_string()),
            file_path: None,
        };
        assert!(empty.validate().is_err());

        let with_file = CreateSubmission {
            content: None,
            file_path: Some("uploads/essay.pdf".to_string()),
            ..empty.clone()
        };
        assert!(with_file.validate().is_ok());
    }

    #[test]
    fn test_grade_bounds() {
        let over = GradeSubmission {
            grade: 101.0,
            feedback: None,
        };
        assert!(over.validate().is_err());
        let ok = GradeSubmission {
            grade: 88.5,
            feedback: Some("Good structure".to_string()),
        };
        assert!(ok.validate().is_ok());
    }
}
