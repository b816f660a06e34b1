// src/models/request.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'homework_requests' table: a student's question.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct HomeworkRequest {
    pub id: i64,

    /// Owning user. Requests are visible only to their creator.
    pub user_id: i64,

    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub topic: Option<String>,
    pub title: Option<String>,

    /// The question itself.
    pub question_text: String,

    /// Opaque attachment metadata supplied by the client.
    /// Stored as JSONB; this service never interprets it.
    pub attachments: Option<serde_json::Value>,

    /// 'open', 'answered' or 'closed'.
    pub status: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a new homework request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRequestPayload {
    #[validate(length(
        min = 1,
        max = 20000,
        message = "Question text must not be empty"
    ))]
    pub question_text: String,

    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub grade_level: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub topic: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(custom(function = validate_blob_size))]
    pub attachments: Option<serde_json::Value>,
}

/// DTO for updating a homework request. Fields are optional; only the
/// supplied ones are written.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRequestPayload {
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub grade_level: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub topic: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 20000))]
    pub question_text: Option<String>,

    #[validate(custom(function = validate_blob_size))]
    pub attachments: Option<serde_json::Value>,

    #[validate(custom(function = validate_request_status))]
    pub status: Option<String>,
}

impl UpdateRequestPayload {
    /// True when no mutable field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.grade_level.is_none()
            && self.topic.is_none()
            && self.title.is_none()
            && self.question_text.is_none()
            && self.attachments.is_none()
            && self.status.is_none()
    }
}

/// Query parameters for listing homework requests.
#[derive(Debug, Deserialize)]
pub struct RequestListParams {
    /// Exact status filter: 'open', 'answered' or 'closed'.
    pub status: Option<String>,
}

/// Restricts a request status to the three allowed values.
pub fn validate_request_status(status: &str) -> Result<(), validator::ValidationError> {
    if status != "open" && status != "answered" && status != "closed" {
        return Err(validator::ValidationError::new("invalid_status"));
    }
    Ok(())
}

/// Limits the total JSON payload size to prevent resource exhaustion attacks.
pub fn validate_blob_size(data: &serde_json::Value) -> Result<(), validator::ValidationError> {
    // Limit total JSON size to roughly 50KB to prevent abuse
    if data.to_string().len() > 50000 {
        return Err(validator::ValidationError::new("payload_too_large"));
    }
    Ok(())
}
