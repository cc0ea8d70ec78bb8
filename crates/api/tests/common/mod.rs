//! Shared helpers for HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, SubsecRound, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tutorhub_api::auth::jwt::{generate_access_token, JwtConfig};
use tutorhub_api::config::{FeatureFlags, ServerConfig};
use tutorhub_api::router::build_app_router;
use tutorhub_api::state::AppState;
use tutorhub_core::types::{DbId, Timestamp};
use tutorhub_db::models::cohort::{Cohort, CreateCohort};
use tutorhub_db::models::profile::{CreateProfile, Profile};
use tutorhub_db::models::program::{CreateProgram, Program};
use tutorhub_db::repositories::{CohortRepo, ProfileRepo, ProgramRepo};
use tutorhub_events::EventBus;

pub const APP_URL: &str = "http://app.test";

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry_mins: 60,
    }
}

/// Build a test `ServerConfig` with safe defaults and every feature on.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        app_url: APP_URL.to_string(),
        api_url: "http://api.test".to_string(),
        jwt: jwt_config(),
        features: FeatureFlags::default(),
        reminder_interval_secs: 600,
        token_cleanup_interval_secs: 3600,
    }
}

/// Build the production router over `pool`. No email, no calendar.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, FeatureFlags::default())
}

pub fn build_test_app_with(pool: PgPool, features: FeatureFlags) -> Router {
    let config = ServerConfig {
        features,
        ..test_config()
    };
    app_over(pool, config, Arc::new(EventBus::default()))
}

/// Build the router around a caller-owned bus so tests can subscribe to it.
pub fn build_test_app_with_bus(pool: PgPool, event_bus: Arc<EventBus>) -> Router {
    app_over(pool, test_config(), event_bus)
}

fn app_over(pool: PgPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
        calendar: None,
    };
    build_app_router(state, &config)
}

/// Bearer token for a principal.
pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &jwt_config()).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn profile(pool: &PgPool, email: &str, role: &str) -> Profile {
    ProfileRepo::create(
        pool,
        &CreateProfile {
            email: email.to_string(),
            full_name: Some(email.split('@').next().unwrap_or(email).to_string()),
            timezone: None,
            role: role.to_string(),
            status: None,
        },
    )
    .await
    .unwrap()
}

pub async fn program(pool: &PgPool, name: &str) -> Program {
    ProgramRepo::create(
        pool,
        &CreateProgram {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
}

pub async fn cohort(pool: &PgPool, program_id: DbId, name: &str, capacity: Option<i32>) -> Cohort {
    CohortRepo::create(
        pool,
        &CreateCohort {
            program_id,
            name: name.to_string(),
            color: None,
            capacity,
            stable_meet_link: None,
        },
    )
    .await
    .unwrap()
}

pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(0)
}

pub fn in_hours(hours: i64) -> Timestamp {
    now() + Duration::hours(hours)
}
