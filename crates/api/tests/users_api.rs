//! Parent to student links, family creation, and payment reminders.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_auth, post_json_auth, token_for};
use serde_json::json;
use sqlx::PgPool;
use tutorhub_events::bus::PAYMENT_REMINDER;
use tutorhub_events::EventBus;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_link_and_unlink_student(pool: PgPool) {
    let admin = common::profile(&pool, "admin@example.com", "admin").await;
    let parent = common::profile(&pool, "parent@example.com", "parent").await;
    let student = common::profile(&pool, "kid@example.com", "student").await;
    let token = token_for(admin.id, "admin");
    let uri = format!("/api/v1/users/{}/students", parent.id);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, json!({ "student_id": student.id }), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, json!({ "student_id": student.id }), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A parent may read their own links.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &uri, &token_for(parent.id, "parent")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["email"], "kid@example.com");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("{uri}/{}", student.id), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("{uri}/{}", student.id), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_link_rejects_wrong_roles(pool: PgPool) {
    let admin = common::profile(&pool, "admin@example.com", "admin").await;
    let parent = common::profile(&pool, "parent@example.com", "parent").await;
    let tutor = common::profile(&pool, "tutor@example.com", "tutor").await;
    let token = token_for(admin.id, "admin");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/users/{}/students", parent.id),
        json!({ "student_id": tutor.id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/users/{}/students", tutor.id),
        json!({ "student_id": parent.id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_only_admin_links_students(pool: PgPool) {
    let parent = common::profile(&pool, "parent@example.com", "parent").await;
    let student = common::profile(&pool, "kid@example.com", "student").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/users/{}/students", parent.id),
        json!({ "student_id": student.id }),
        &token_for(parent.id, "parent"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_parent_profile_lists_linked_students(pool: PgPool) {
    let admin = common::profile(&pool, "admin@example.com", "admin").await;
    let token = token_for(admin.id, "admin");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/users/families",
        json!({
            "parent": { "email": "mum@example.com", "full_name": "Mum" },
            "student": { "email": "kid@example.com", "full_name": "Kid" },
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["parent"]["role"], "parent");
    assert_eq!(json["data"]["student"]["role"], "student");
    assert_eq!(json["data"]["student"]["status"], "customer");
    let parent_id = json["data"]["parent"]["id"].as_i64().unwrap();
    let student_id = json["data"]["student"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/users/{parent_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "mum@example.com");
    assert_eq!(json["data"]["linked_students"][0]["student_id"], student_id);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/users/{student_id}"), &token).await;
    let json = body_json(response).await;
    assert!(json["data"].get("linked_students").is_none());

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users?role=parent", &token).await;
    let json = body_json(response).await;
    let parents = json["data"].as_array().unwrap();
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0]["linked_students"][0]["email"], "kid@example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_family_validates_emails(pool: PgPool) {
    let admin = common::profile(&pool, "admin@example.com", "admin").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/users/families",
        json!({
            "parent": { "email": "mum@example.com" },
            "student": { "email": "not-an-email" },
        }),
        &token_for(admin.id, "admin"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_payment_reminders_publish_one_batch(pool: PgPool) {
    let admin = common::profile(&pool, "admin@example.com", "admin").await;
    let first = common::profile(&pool, "a@example.com", "parent").await;
    let second = common::profile(&pool, "b@example.com", "parent").await;
    let third = common::profile(&pool, "c@example.com", "student").await;
    sqlx::query("UPDATE profiles SET status = 'customer' WHERE id = $1")
        .bind(admin.id)
        .execute(&pool)
        .await
        .unwrap();

    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();

    let app = common::build_test_app_with_bus(pool, bus.clone());
    let response = post_auth(
        app,
        "/api/v1/users/status/payment-reminders",
        &token_for(admin.id, "admin"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["queued"], 3);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.event_type, PAYMENT_REMINDER);
    let mut ids: Vec<i64> = event.payload["reminders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["user_id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
    assert!(rx.try_recv().is_err());
}
