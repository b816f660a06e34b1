// tests/job_tests.rs

use homework_backend::{config::Config, routes, state::AppState, utils::jwt::sign_jwt};
use sqlx::postgres::PgPoolOptions;

const TEST_SECRET: &str = "job_test_secret";

async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
    };

    let state = AppState { pool, config };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn token_for(user_id: i64) -> String {
    sign_jwt(user_id, TEST_SECRET, 600).expect("Failed to sign test token")
}

fn unique_user_id() -> i64 {
    (uuid::Uuid::new_v4().as_u128() & 0x7fff_ffff_ffff_ffff) as i64
}

async fn create_request(client: &reqwest::Client, address: &str, token: &str) -> i64 {
    let created: serde_json::Value = client
        .post(&format!("{}/api/requests", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "question_text": "Integrate sin(x)" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    created["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn create_job_without_request_uses_defaults() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token_for(unique_user_id());

    let response = client
        .post(&format!("{}/api/jobs", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["job_type"], "full_solution");
    assert_eq!(data["status"], "completed");
    assert!(data["request_id"].is_null());
}

#[tokio::test]
async fn create_job_records_precomputed_result() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token_for(unique_user_id());
    let request_id = create_request(&client, &address, &token).await;

    let response = client
        .post(&format!("{}/api/jobs", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "request_id": request_id,
            "job_type": "step_by_step",
            "input": { "prompt": "Integrate sin(x)" },
            "output": { "answer": "-cos(x) + C" },
            "status": "completed"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["job_type"], "step_by_step");
    assert_eq!(data["request_id"].as_i64(), Some(request_id));
    assert_eq!(data["output"]["answer"], "-cos(x) + C");
}

#[tokio::test]
async fn create_job_rejects_unknown_type_and_status() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token_for(unique_user_id());

    let bad_type = client
        .post(&format!("{}/api/jobs", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "job_type": "summary" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_type.status().as_u16(), 400);

    let bad_status = client
        .post(&format!("{}/api/jobs", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "status": "running" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_status.status().as_u16(), 400);
}

#[tokio::test]
async fn create_job_rejects_foreign_request() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token_a = token_for(unique_user_id());
    let token_b = token_for(unique_user_id());
    let request_id = create_request(&client, &address, &token_a).await;

    let response = client
        .post(&format!("{}/api/jobs", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&serde_json::json!({ "request_id": request_id }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_jobs_filters_by_request() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token_for(unique_user_id());
    let request_id = create_request(&client, &address, &token).await;

    for _ in 0..2 {
        client
            .post(&format!("{}/api/jobs", address))
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({ "request_id": request_id }))
            .send()
            .await
            .unwrap();
    }

    // One stray job without a parent request.
    client
        .post(&format!("{}/api/jobs", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();

    let all: serde_json::Value = client
        .get(&format!("{}/api/jobs", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["data"]["count"], 3);

    let filtered: serde_json::Value = client
        .get(&format!("{}/api/jobs?request_id={}", address, request_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(filtered["data"]["count"], 2);
    for item in filtered["data"]["items"].as_array().unwrap() {
        assert_eq!(item["request_id"].as_i64(), Some(request_id));
    }
}

#[tokio::test]
async fn jobs_are_scoped_per_user() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token_a = token_for(unique_user_id());
    let token_b = token_for(unique_user_id());

    client
        .post(&format!("{}/api/jobs", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({ "job_type": "hint_only" }))
        .send()
        .await
        .unwrap();

    let listing: serde_json::Value = client
        .get(&format!("{}/api/jobs", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(listing["data"]["count"], 0);
}
