//! Validation helpers for DTOs.

use std::collections::HashSet;

use validator::ValidationError;

use crate::state::session::ROUND_ONE_CAUSE_COUNT;

/// Validates that a quiz id is a non-empty trimmed string of at most 100
/// characters, so it stays usable as a document key.
pub fn validate_quiz_id(id: &str) -> Result<(), ValidationError> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed != id {
        let mut err = ValidationError::new("quiz_id_shape");
        err.message = Some("Quiz id must be non-empty without surrounding whitespace".into());
        return Err(err);
    }

    if id.len() > 100 {
        let mut err = ValidationError::new("quiz_id_length");
        err.message = Some(format!("Quiz id must be at most 100 characters (got {})", id.len()).into());
        return Err(err);
    }

    if id.contains('/') {
        let mut err = ValidationError::new("quiz_id_format");
        err.message = Some("Quiz id must not contain `/`".into());
        return Err(err);
    }

    Ok(())
}

/// Validates the quiz content invariant at the editing boundary: exactly ten
/// distinct causes, and the correct cause string-identical to one of them.
pub fn validate_root_causes(causes: &[String], correct: &str) -> Result<(), ValidationError> {
    if causes.len() != ROUND_ONE_CAUSE_COUNT {
        let mut err = ValidationError::new("root_causes_count");
        err.message = Some(
            format!(
                "A quiz requires exactly {} root causes (got {})",
                ROUND_ONE_CAUSE_COUNT,
                causes.len()
            )
            .into(),
        );
        return Err(err);
    }

    let distinct: HashSet<&str> = causes.iter().map(String::as_str).collect();
    if distinct.len() != causes.len() {
        let mut err = ValidationError::new("root_causes_distinct");
        err.message = Some("Root causes must be distinct".into());
        return Err(err);
    }

    if !causes.iter().any(|cause| cause == correct) {
        let mut err = ValidationError::new("correct_root_cause");
        err.message = Some("The correct root cause must be one of the ten candidates".into());
        return Err(err);
    }

    Ok(())
}
