//! Principal extraction and role enforcement.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json_auth, token_for};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/programs").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_garbage_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/programs", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_role_claim_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/programs", &token_for(1, "superuser")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_student_cannot_create_program(pool: PgPool) {
    let student = common::profile(&pool, "s@example.com", "student").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/programs",
        json!({ "name": "Year 10" }),
        &token_for(student.id, "student"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_tutor_cannot_list_users(pool: PgPool) {
    let tutor = common::profile(&pool, "t@example.com", "tutor").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/users", &token_for(tutor.id, "tutor")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_reads_own_profile_but_not_others(pool: PgPool) {
    let me = common::profile(&pool, "me@example.com", "parent").await;
    let other = common::profile(&pool, "other@example.com", "parent").await;
    let token = token_for(me.id, "parent");

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/users/{}", me.id), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "me@example.com");

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/users/{}", other.id), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
