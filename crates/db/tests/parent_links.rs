//! Integration tests for parent to student links.

mod common;

use sqlx::PgPool;
use tutorhub_db::models::parent_link::{CreateFamily, FamilyMember};
use tutorhub_db::repositories::{ParentLinkRepo, ProfileRepo};

use common::*;

fn family(parent_email: &str, student_email: &str) -> CreateFamily {
    CreateFamily {
        parent: FamilyMember {
            email: parent_email.to_string(),
            full_name: Some("Pat Parent".to_string()),
        },
        student: FamilyMember {
            email: student_email.to_string(),
            full_name: Some("Sam Student".to_string()),
        },
        timezone: Some("Australia/Melbourne".to_string()),
        status: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_family_links_new_profiles(pool: PgPool) {
    let created = ParentLinkRepo::create_family(&pool, &family("p@example.com", "s@example.com"))
        .await
        .unwrap();

    assert_eq!(created.parent.role, "parent");
    assert_eq!(created.student.role, "student");
    assert_eq!(created.parent.status, "customer");
    assert_eq!(created.student.timezone, "Australia/Melbourne");
    assert_eq!(created.link.parent_id, created.parent.id);
    assert_eq!(created.link.student_id, created.student.id);

    let students = ParentLinkRepo::list_students(&pool, created.parent.id).await.unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].email, "s@example.com");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_family_is_all_or_nothing(pool: PgPool) {
    student(&pool, "taken@example.com").await;

    let result =
        ParentLinkRepo::create_family(&pool, &family("p@example.com", "taken@example.com")).await;
    assert!(result.is_err());

    let parents = ProfileRepo::list(&pool, Some("parent"), None).await.unwrap();
    assert!(parents.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_link_hits_unique_constraint(pool: PgPool) {
    let parent = profile(&pool, "p@example.com", "parent").await;
    let kid = student(&pool, "s@example.com").await;

    ParentLinkRepo::create(&pool, parent.id, kid.id).await.unwrap();
    let err = ParentLinkRepo::create(&pool, parent.id, kid.id).await.unwrap_err();
    let constraint = err
        .as_database_error()
        .and_then(|e| e.constraint())
        .map(str::to_string);
    assert_eq!(constraint.as_deref(), Some("uq_parent_student_links"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_links_grouped_per_parent_and_removable(pool: PgPool) {
    let mum = profile(&pool, "mum@example.com", "parent").await;
    let dad = profile(&pool, "dad@example.com", "parent").await;
    let a = student(&pool, "a@example.com").await;
    let b = student(&pool, "b@example.com").await;

    ParentLinkRepo::create(&pool, mum.id, a.id).await.unwrap();
    ParentLinkRepo::create(&pool, mum.id, b.id).await.unwrap();
    ParentLinkRepo::create(&pool, dad.id, a.id).await.unwrap();

    let links = ParentLinkRepo::list_students_for_parents(&pool, &[mum.id, dad.id])
        .await
        .unwrap();
    assert_eq!(links.iter().filter(|l| l.parent_id == mum.id).count(), 2);
    assert_eq!(links.iter().filter(|l| l.parent_id == dad.id).count(), 1);

    assert!(ParentLinkRepo::delete(&pool, mum.id, a.id).await.unwrap());
    assert!(!ParentLinkRepo::delete(&pool, mum.id, a.id).await.unwrap());
    let remaining = ParentLinkRepo::list_students(&pool, mum.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].student_id, b.id);
}
