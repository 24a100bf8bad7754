#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test,
};
use chrono::{Duration, Utc};
use dotenv::dotenv;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use taskledger::{
    auth::{AuthSettings, TokenKeys, TokenResponse},
    db,
};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";
pub const PASSWORD: &str = "password123";

/// Connects to `DATABASE_URL` and applies migrations.
pub async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations on test DB");
    pool
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings::new(TokenKeys::new(TEST_SECRET, Duration::minutes(30)), 4)
        .expect("Failed to build auth settings")
}

/// A username no other test run will pick.
pub fn unique_username(prefix: &str) -> String {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}_{:x}_{}", prefix, Utc::now().timestamp_micros(), n)
}

/// Builds the full application around `pool`, the way `main` does.
macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new(common::auth_settings()))
                .configure(taskledger::routes::config),
        )
        .await
    };
}

pub async fn call<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body).into_owned())
        })
    };
    (status, json)
}

pub async fn register<S, B>(app: &S, username: &str, password: &str) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(serde_json::json!({ "username": username, "password": password }))
        .to_request();
    call(app, req).await.0
}

pub async fn login<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Option<String>)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/token")
        .set_form([("username", username), ("password", password)])
        .to_request();
    let (status, body) = call(app, req).await;
    let token = serde_json::from_value::<TokenResponse>(body)
        .ok()
        .map(|response| {
            assert_eq!(response.token_type, "bearer");
            response.access_token
        });
    (status, token)
}

/// Registers a fresh user and logs in, returning `(username, token)`.
pub async fn signed_up_user<S, B>(app: &S, prefix: &str) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let username = unique_username(prefix);
    assert_eq!(register(app, &username, PASSWORD).await, StatusCode::OK);
    let (status, token) = login(app, &username, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    (username, token.expect("login should return a token"))
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Removes a user left behind by a test, if it still exists.
pub async fn cleanup_user(pool: &PgPool, username: &str) {
    if let Ok(Some(user)) = db::users::find_user_by_name(pool, username).await {
        let _ = db::users::delete_user(pool, user.id).await;
    }
}
