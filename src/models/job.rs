// src/models/job.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::request::validate_blob_size;

/// Represents the 'homework_jobs' table: a record of an (externally
/// performed) AI answer-generation attempt. Jobs are write-once; the
/// generation work itself happens outside this service.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct HomeworkJob {
    pub id: i64,

    /// Parent request, when the generation attempt targeted one.
    pub request_id: Option<i64>,

    /// Creating user. Nullable in the schema, always set by the handler.
    pub user_id: Option<i64>,

    /// 'explanation', 'step_by_step', 'hint_only', 'full_solution' or 'other'.
    pub job_type: String,

    /// Generation input, recorded verbatim.
    pub input: Option<serde_json::Value>,

    /// Generation output, recorded verbatim.
    pub output: Option<serde_json::Value>,

    /// 'pending', 'completed' or 'failed'.
    pub status: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for recording a generation attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobPayload {
    pub request_id: Option<i64>,

    #[validate(custom(function = validate_job_type))]
    pub job_type: Option<String>,

    #[validate(custom(function = validate_blob_size))]
    pub input: Option<serde_json::Value>,

    #[validate(custom(function = validate_blob_size))]
    pub output: Option<serde_json::Value>,

    #[validate(custom(function = validate_job_status))]
    pub status: Option<String>,
}

/// Query parameters for listing jobs.
#[derive(Debug, Deserialize)]
pub struct JobListParams {
    /// Exact parent request filter.
    pub request_id: Option<i64>,
}

/// Restricts a job type to the allowed values.
pub fn validate_job_type(job_type: &str) -> Result<(), validator::ValidationError> {
    match job_type {
        "explanation" | "step_by_step" | "hint_only" | "full_solution" | "other" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_job_type")),
    }
}

/// Restricts a job status to the allowed values.
pub fn validate_job_status(status: &str) -> Result<(), validator::ValidationError> {
    match status {
        "pending" | "completed" | "failed" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_job_status")),
    }
}
