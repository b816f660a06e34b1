// src/handlers/request.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::AppError,
    models::request::{
        CreateRequestPayload, HomeworkRequest, RequestListParams, UpdateRequestPayload,
        validate_request_status,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Column list for homework_requests queries.
const REQUEST_COLUMNS: &str = "id, user_id, subject, grade_level, topic, title, \
    question_text, attachments, status, created_at, updated_at";

/// Fetches a request row scoped to its owner.
///
/// A real id owned by another user yields the same NotFound as a bogus id,
/// so foreign requests cannot be probed. Every sub-resource handler calls
/// this before touching responses or jobs.
pub async fn find_owned_request(
    pool: &PgPool,
    request_id: i64,
    user_id: i64,
) -> Result<HomeworkRequest, AppError> {
    let query =
        format!("SELECT {REQUEST_COLUMNS} FROM homework_requests WHERE id = $1 AND user_id = $2");

    sqlx::query_as::<_, HomeworkRequest>(&query)
        .bind(request_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::NotFound("Request not found".to_string()))
}

/// Submit a new homework request.
///
/// Question text is required; classification fields are optional. The row
/// starts out 'open' with both timestamps set by the database.
pub async fn create_request(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.sub.parse::<i64>().unwrap_or(0);
    let question_text = clean_html(&payload.question_text);

    let query = format!(
        "INSERT INTO homework_requests
            (user_id, subject, grade_level, topic, title, question_text, attachments)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {REQUEST_COLUMNS}"
    );

    let request = sqlx::query_as::<_, HomeworkRequest>(&query)
        .bind(user_id)
        .bind(payload.subject)
        .bind(payload.grade_level)
        .bind(payload.topic)
        .bind(payload.title)
        .bind(question_text)
        .bind(payload.attachments)
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create request: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": request })),
    ))
}

/// Update a homework request.
///
/// Partial-update semantics: only the supplied fields are written, omitted
/// ones stay untouched. `updated_at` is always refreshed.
pub async fn update_request(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        return Err(AppError::BadRequest(
            "At least one field must be provided".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    find_owned_request(&pool, id, user_id).await?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE homework_requests SET ");
    let mut separated = builder.separated(", ");

    if let Some(subject) = payload.subject {
        separated.push("subject = ");
        separated.push_bind_unseparated(subject);
    }

    if let Some(grade_level) = payload.grade_level {
        separated.push("grade_level = ");
        separated.push_bind_unseparated(grade_level);
    }

    if let Some(topic) = payload.topic {
        separated.push("topic = ");
        separated.push_bind_unseparated(topic);
    }

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
    }

    if let Some(question_text) = payload.question_text {
        separated.push("question_text = ");
        separated.push_bind_unseparated(clean_html(&question_text));
    }

    if let Some(attachments) = payload.attachments {
        separated.push("attachments = ");
        separated.push_bind_unseparated(attachments);
    }

    if let Some(status) = payload.status {
        separated.push("status = ");
        separated.push_bind_unseparated(status);
    }

    separated.push("updated_at = NOW()");

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" AND user_id = ");
    builder.push_bind(user_id);
    builder.push(format!(" RETURNING {REQUEST_COLUMNS}"));

    let request = builder
        .build_query_as::<HomeworkRequest>()
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update request: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Request not found".to_string()))?;

    Ok(Json(serde_json::json!({ "success": true, "data": request })))
}

/// List the caller's homework requests, newest first.
/// Supports an exact status filter.
pub async fn list_requests(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<RequestListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    if let Some(status) = &params.status {
        validate_request_status(status)
            .map_err(|_| AppError::BadRequest("Invalid status filter".to_string()))?;
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {REQUEST_COLUMNS} FROM homework_requests WHERE user_id = "
    ));
    builder.push_bind(user_id);

    if let Some(status) = params.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY created_at DESC");

    let items = builder
        .build_query_as::<HomeworkRequest>()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list requests: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    let count = items.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "items": items, "count": count }
    })))
}
