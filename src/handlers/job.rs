// src/handlers/job.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::request::find_owned_request,
    models::job::{CreateJobPayload, HomeworkJob, JobListParams},
    utils::jwt::Claims,
};

/// Column list for homework_jobs queries.
const JOB_COLUMNS: &str = "id, request_id, user_id, job_type, input, output, status, created_at";

/// Record an answer-generation attempt.
///
/// This layer is a passive recorder: the status and output arrive
/// precomputed, no generation work happens here. A supplied request id must
/// belong to the caller.
pub async fn create_job(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    if let Some(request_id) = payload.request_id {
        find_owned_request(&pool, request_id, user_id).await?;
    }

    let job_type = payload
        .job_type
        .unwrap_or_else(|| "full_solution".to_string());
    let status = payload.status.unwrap_or_else(|| "completed".to_string());

    let query = format!(
        "INSERT INTO homework_jobs
            (request_id, user_id, job_type, input, output, status)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {JOB_COLUMNS}"
    );

    let job = sqlx::query_as::<_, HomeworkJob>(&query)
        .bind(payload.request_id)
        .bind(user_id)
        .bind(job_type)
        .bind(payload.input)
        .bind(payload.output)
        .bind(status)
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create job: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": job })),
    ))
}

/// List the caller's job records, newest first.
/// Supports an exact parent-request filter.
pub async fn list_jobs(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<JobListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {JOB_COLUMNS} FROM homework_jobs WHERE user_id = "
    ));
    builder.push_bind(user_id);

    if let Some(request_id) = params.request_id {
        builder.push(" AND request_id = ");
        builder.push_bind(request_id);
    }

    builder.push(" ORDER BY created_at DESC");

    let items = builder
        .build_query_as::<HomeworkJob>()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list jobs: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    let count = items.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "items": items, "count": count }
    })))
}
