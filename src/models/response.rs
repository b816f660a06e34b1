// src/models/response.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::request::validate_blob_size;

/// Represents the 'homework_responses' table: an answer to a request.
/// A request can accumulate several responses (multiple AI variants,
/// future human answers).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct HomeworkResponse {
    pub id: i64,

    /// Parent request.
    pub request_id: i64,

    /// Answering user; NULL for AI-generated answers.
    pub responder_id: Option<i64>,

    /// 'ai', 'user', 'teacher' or 'other'.
    pub source: String,

    pub answer_text: String,

    /// Ordered step objects, stored opaquely as JSONB.
    pub steps: Option<serde_json::Value>,

    /// Whether the student adopted this answer.
    pub is_accepted: bool,

    /// Student rating, 1 to 5.
    pub rating: Option<i32>,

    pub feedback: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for attaching a new response to a request.
#[derive(Debug, Deserialize, Validate)]
pub struct AddResponsePayload {
    #[validate(length(min = 1, max = 50000, message = "Answer text must not be empty"))]
    pub answer_text: String,

    #[validate(custom(function = validate_blob_size))]
    pub steps: Option<serde_json::Value>,

    pub is_accepted: Option<bool>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,

    #[validate(length(min = 1, max = 2000))]
    pub feedback: Option<String>,

    #[validate(custom(function = validate_response_source))]
    pub source: Option<String>,
}

/// DTO for updating a response. Only acceptance, rating and feedback are
/// mutable; at least one must be supplied.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateResponsePayload {
    pub is_accepted: Option<bool>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,

    #[validate(length(min = 1, max = 2000))]
    pub feedback: Option<String>,
}

impl UpdateResponsePayload {
    pub fn is_empty(&self) -> bool {
        self.is_accepted.is_none() && self.rating.is_none() && self.feedback.is_none()
    }
}

/// Restricts a response source to the allowed values.
pub fn validate_response_source(source: &str) -> Result<(), validator::ValidationError> {
    match source {
        "ai" | "user" | "teacher" | "other" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_source")),
    }
}
