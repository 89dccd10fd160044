use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::QuizEntity,
    dto::validation::{validate_quiz_id, validate_root_causes},
};

/// Payload used to author a new quiz definition.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateQuizRequest {
    /// Admin-chosen unique id; becomes the immutable document key.
    pub id: String,
    /// Narrative text shown during round 1.
    pub passage: String,
    /// Exactly ten distinct candidate root causes.
    pub root_causes: Vec<String>,
    /// The correct cause; must equal one of the candidates exactly.
    pub correct_root_cause: String,
    /// Text revealed after a successful run.
    pub explanation: String,
}

impl Validate for CreateQuizRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_quiz_id(&self.id) {
            errors.add("id", e);
        }

        if self.passage.trim().is_empty() {
            errors.add("passage", simple_error("passage", "passage must not be empty"));
        }

        if let Err(e) = validate_root_causes(&self.root_causes, &self.correct_root_cause) {
            errors.add("root_causes", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl From<CreateQuizRequest> for QuizEntity {
    fn from(request: CreateQuizRequest) -> Self {
        Self {
            passage: request.passage,
            root_causes: request.root_causes,
            correct_root_cause: request.correct_root_cause,
            explanation: request.explanation,
        }
    }
}

/// Partial payload merged into an existing quiz definition. Omitted fields
/// are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateQuizRequest {
    #[serde(default)]
    pub passage: Option<String>,
    #[serde(default)]
    pub root_causes: Option<Vec<String>>,
    #[serde(default)]
    pub correct_root_cause: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl UpdateQuizRequest {
    /// Merge this partial payload over an existing definition.
    pub fn apply(self, existing: &QuizEntity) -> QuizEntity {
        QuizEntity {
            passage: self.passage.unwrap_or_else(|| existing.passage.clone()),
            root_causes: self
                .root_causes
                .unwrap_or_else(|| existing.root_causes.clone()),
            correct_root_cause: self
                .correct_root_cause
                .unwrap_or_else(|| existing.correct_root_cause.clone()),
            explanation: self
                .explanation
                .unwrap_or_else(|| existing.explanation.clone()),
        }
    }
}

/// Full quiz definition exposed to the admin surface.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizSummary {
    pub id: String,
    pub passage: String,
    pub root_causes: Vec<String>,
    pub correct_root_cause: String,
    pub explanation: String,
}

impl From<(String, QuizEntity)> for QuizSummary {
    fn from((id, quiz): (String, QuizEntity)) -> Self {
        Self {
            id,
            passage: quiz.passage,
            root_causes: quiz.root_causes,
            correct_root_cause: quiz.correct_root_cause,
            explanation: quiz.explanation,
        }
    }
}

fn simple_error(code: &'static str, message: &'static str) -> validator::ValidationError {
    let mut err = validator::ValidationError::new(code);
    err.message = Some(message.into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateQuizRequest {
        CreateQuizRequest {
            id: "server-outage".to_string(),
            passage: "At 03:12 the API started timing out.".to_string(),
            root_causes: (0..10).map(|i| format!("cause-{i}")).collect(),
            correct_root_cause: "cause-7".to_string(),
            explanation: "Connection pool exhaustion.".to_string(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn correct_cause_outside_candidates_is_rejected() {
        let mut bad = request();
        bad.correct_root_cause = "not-a-candidate".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let existing: QuizEntity = request().into();
        let update = UpdateQuizRequest {
            explanation: Some("A retry storm.".to_string()),
            ..Default::default()
        };

        let merged = update.apply(&existing);
        assert_eq!(merged.explanation, "A retry storm.");
        assert_eq!(merged.passage, existing.passage);
        assert_eq!(merged.root_causes, existing.root_causes);
    }
}
