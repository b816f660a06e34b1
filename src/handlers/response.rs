// src/handlers/response.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::request::find_owned_request,
    models::response::{AddResponsePayload, HomeworkResponse, UpdateResponsePayload},
    utils::{html::clean_html, jwt::Claims},
};

/// Column list for homework_responses queries.
const RESPONSE_COLUMNS: &str = "id, request_id, responder_id, source, answer_text, \
    steps, is_accepted, rating, feedback, created_at";

/// Attach a new response to an owned request.
///
/// When the response arrives already accepted, the parent request moves to
/// 'answered' in the same transaction as the insert.
pub async fn add_response(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<i64>,
    Json(payload): Json<AddResponsePayload>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    find_owned_request(&pool, request_id, user_id).await?;

    let source = payload.source.unwrap_or_else(|| "ai".to_string());
    let is_accepted = payload.is_accepted.unwrap_or(false);
    let answer_text = clean_html(&payload.answer_text);

    // AI answers carry no answering user; human-sourced ones are attributed
    // to the caller.
    let responder_id = if source == "ai" { None } else { Some(user_id) };

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let query = format!(
        "INSERT INTO homework_responses
            (request_id, responder_id, source, answer_text, steps, is_accepted, rating, feedback)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {RESPONSE_COLUMNS}"
    );

    let response = sqlx::query_as::<_, HomeworkResponse>(&query)
        .bind(request_id)
        .bind(responder_id)
        .bind(source)
        .bind(answer_text)
        .bind(payload.steps)
        .bind(is_accepted)
        .bind(payload.rating)
        .bind(payload.feedback)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to add response: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if is_accepted {
        sqlx::query(
            "UPDATE homework_requests SET status = 'answered', updated_at = NOW() WHERE id = $1",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": response })),
    ))
}

/// Update acceptance, rating or feedback on a response.
///
/// The response must live under the given request; an id that exists under
/// a different request is treated as missing. An explicit acceptance toggle
/// moves the parent request to 'answered' (true) or back to 'open' (false)
/// in the same transaction. The parent status mirrors the last toggle, not
/// whether any accepted sibling remains.
pub async fn update_response(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path((request_id, response_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateResponsePayload>,
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

    find_owned_request(&pool, request_id, user_id).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let existing =
        sqlx::query("SELECT id FROM homework_responses WHERE id = $1 AND request_id = $2")
            .bind(response_id)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if existing.is_none() {
        return Err(AppError::NotFound("Response not found".to_string()));
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE homework_responses SET ");
    let mut separated = builder.separated(", ");

    if let Some(is_accepted) = payload.is_accepted {
        separated.push("is_accepted = ");
        separated.push_bind_unseparated(is_accepted);
    }

    if let Some(rating) = payload.rating {
        separated.push("rating = ");
        separated.push_bind_unseparated(rating);
    }

    if let Some(feedback) = payload.feedback {
        separated.push("feedback = ");
        separated.push_bind_unseparated(feedback);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(response_id);
    builder.push(format!(" RETURNING {RESPONSE_COLUMNS}"));

    let response = builder
        .build_query_as::<HomeworkResponse>()
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update response: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if let Some(accepted) = payload.is_accepted {
        let status = if accepted { "answered" } else { "open" };

        sqlx::query("UPDATE homework_requests SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status)
            .bind(request_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(serde_json::json!({ "success": true, "data": response })))
}

/// List all responses for an owned request, oldest first.
pub async fn list_responses(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    find_owned_request(&pool, request_id, user_id).await?;

    let query = format!(
        "SELECT {RESPONSE_COLUMNS} FROM homework_responses
         WHERE request_id = $1
         ORDER BY created_at ASC"
    );

    let items = sqlx::query_as::<_, HomeworkResponse>(&query)
        .bind(request_id)
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list responses: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    let count = items.len();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "items": items, "count": count }
    })))
}
