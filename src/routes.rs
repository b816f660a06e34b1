// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{job, request, response},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Nests the homework sub-routers behind the auth middleware.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let request_routes = Router::new()
        .route(
            "/",
            post(request::create_request).get(request::list_requests),
        )
        .route("/{id}", put(request::update_request))
        .route(
            "/{id}/responses",
            post(response::add_response).get(response::list_responses),
        )
        .route(
            "/{id}/responses/{response_id}",
            put(response::update_response),
        );

    let job_routes = Router::new().route("/", post(job::create_job).get(job::list_jobs));

    Router::new()
        .nest(
            "/api/requests",
            request_routes.layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .nest(
            "/api/jobs",
            job_routes.layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
