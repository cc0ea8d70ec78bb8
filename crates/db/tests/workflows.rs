//! Integration tests for reschedule requests, the waitlist, and status changes.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;
use tutorhub_core::customer_status::{expired_pending_cutoff, STATUS_CUSTOMER};
use tutorhub_db::models::reschedule::{CreateRescheduleRequest, SubmitOutcome};
use tutorhub_db::models::waitlist::PlacementOutcome;
use tutorhub_db::repositories::{
    BookingRepo, CohortRepo, ProfileRepo, RescheduleRepo, WaitlistRepo,
};

use common::*;

fn request(event_id: i64) -> CreateRescheduleRequest {
    CreateRescheduleRequest {
        event_id,
        notes: Some("Clash with exam".into()),
    }
}

// ---------------------------------------------------------------------------
// Reschedule requests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_one_pending_request_per_event(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let event = applied_event(&pool, c.id, None, admin.id, in_days(5)).await;
    BookingRepo::book(&pool, event.id, s.id, now()).await.unwrap();

    let first = RescheduleRepo::submit(&pool, s.id, &request(event.id)).await.unwrap();
    let SubmitOutcome::Created(first) = first else {
        panic!("expected created, got {first:?}");
    };
    assert_eq!(first.status, "pending");

    let dup = RescheduleRepo::submit(&pool, s.id, &request(event.id)).await.unwrap();
    assert_matches!(dup, SubmitOutcome::DuplicatePending);

    let decided = RescheduleRepo::decide(&pool, first.id, "denied", admin.id, Some("No room"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(decided.status, "denied");
    assert_eq!(decided.handled_by, Some(admin.id));
    assert!(decided.handled_at.is_some());

    // A fresh request is allowed once the first is decided.
    let again = RescheduleRepo::submit(&pool, s.id, &request(event.id)).await.unwrap();
    assert_matches!(again, SubmitOutcome::Created(_));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_partial_index_rejects_second_pending(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let event = applied_event(&pool, c.id, None, admin.id, in_days(5)).await;

    let insert = "INSERT INTO reschedule_requests (user_id, event_id) VALUES ($1, $2)";
    sqlx::query(insert).bind(s.id).bind(event.id).execute(&pool).await.unwrap();
    let err = sqlx::query(insert)
        .bind(s.id)
        .bind(event.id)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_reschedule_requests_pending")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_submit_requires_booking(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let event = applied_event(&pool, c.id, None, admin.id, in_days(5)).await;

    let outcome = RescheduleRepo::submit(&pool, s.id, &request(event.id)).await.unwrap();
    assert_matches!(outcome, SubmitOutcome::NotBooked);

    let outcome = RescheduleRepo::submit(&pool, s.id, &request(777_777)).await.unwrap();
    assert_matches!(outcome, SubmitOutcome::EventNotFound);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_decided_requests_are_final(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let event = applied_event(&pool, c.id, None, admin.id, in_days(5)).await;
    BookingRepo::book(&pool, event.id, s.id, now()).await.unwrap();

    let SubmitOutcome::Created(req) =
        RescheduleRepo::submit(&pool, s.id, &request(event.id)).await.unwrap()
    else {
        panic!("expected created");
    };
    RescheduleRepo::decide(&pool, req.id, "approved", admin.id, None)
        .await
        .unwrap()
        .unwrap();

    assert!(RescheduleRepo::decide(&pool, req.id, "denied", admin.id, None)
        .await
        .unwrap()
        .is_none());
    assert!(!RescheduleRepo::delete_pending(&pool, req.id).await.unwrap());

    // The decision does not move the event or drop the booking.
    assert!(BookingRepo::find(&pool, event.id, s.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cancel_pending_deletes_row(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let event = applied_event(&pool, c.id, None, admin.id, in_days(5)).await;
    BookingRepo::book(&pool, event.id, s.id, now()).await.unwrap();

    let SubmitOutcome::Created(req) =
        RescheduleRepo::submit(&pool, s.id, &request(event.id)).await.unwrap()
    else {
        panic!("expected created");
    };
    assert!(RescheduleRepo::delete_pending(&pool, req.id).await.unwrap());
    assert!(RescheduleRepo::find_by_id(&pool, req.id).await.unwrap().is_none());

    let pending = RescheduleRepo::list(&pool, Some("pending")).await.unwrap();
    assert!(pending.is_empty());
}

// ---------------------------------------------------------------------------
// Waitlist
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_place_student(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let entry = WaitlistRepo::create(&pool, s.id, Some(prog.id), Some("Evenings only"))
        .await
        .unwrap();

    let outcome = WaitlistRepo::place(&pool, entry.id, s.id, c.id, admin.id)
        .await
        .unwrap();
    assert_matches!(outcome, PlacementOutcome::Placed { status_changed: true, .. });

    assert!(WaitlistRepo::find_by_id(&pool, entry.id).await.unwrap().is_none());
    assert_eq!(CohortRepo::count_students(&pool, c.id).await.unwrap(), 1);
    let profile = ProfileRepo::find_by_id(&pool, s.id).await.unwrap().unwrap();
    assert_eq!(profile.status, STATUS_CUSTOMER);

    let history = ProfileRepo::list_status_history(&pool, Some(s.id), 20)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_status.as_deref(), Some("pending_customer"));
    assert_eq!(history[0].new_status, STATUS_CUSTOMER);

    // Stale id: the entry is gone.
    let again = WaitlistRepo::place(&pool, entry.id, s.id, c.id, admin.id)
        .await
        .unwrap();
    assert_matches!(again, PlacementOutcome::EntryNotFound);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_place_rolls_back_on_duplicate_enrollment(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    CohortRepo::enroll_student(&pool, c.id, s.id).await.unwrap();
    let entry = WaitlistRepo::create(&pool, s.id, None, None).await.unwrap();

    let outcome = WaitlistRepo::place(&pool, entry.id, s.id, c.id, admin.id)
        .await
        .unwrap();
    assert_matches!(outcome, PlacementOutcome::AlreadyEnrolled);
    assert!(WaitlistRepo::find_by_id(&pool, entry.id).await.unwrap().is_some());
    let profile = ProfileRepo::find_by_id(&pool, s.id).await.unwrap().unwrap();
    assert_eq!(profile.status, "pending_customer");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_place_checks_student_and_cohort(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let other = student(&pool, "o@example.com").await;
    let entry = WaitlistRepo::create(&pool, s.id, None, None).await.unwrap();

    let outcome = WaitlistRepo::place(&pool, entry.id, other.id, c.id, admin.id)
        .await
        .unwrap();
    assert_matches!(outcome, PlacementOutcome::StudentMismatch);

    let outcome = WaitlistRepo::place(&pool, entry.id, s.id, 99_999, admin.id)
        .await
        .unwrap();
    assert_matches!(outcome, PlacementOutcome::CohortNotFound);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_waitlist_listing_and_removal(pool: PgPool) {
    let a = student(&pool, "a@example.com").await;
    let b = student(&pool, "b@example.com").await;
    let first = WaitlistRepo::create(&pool, a.id, None, None).await.unwrap();
    WaitlistRepo::create(&pool, b.id, None, None).await.unwrap();

    let list = WaitlistRepo::list(&pool).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, first.id);

    assert!(WaitlistRepo::delete(&pool, first.id).await.unwrap());
    assert!(!WaitlistRepo::delete(&pool, first.id).await.unwrap());
    // Removal has no side effects on status.
    let profile = ProfileRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(profile.status, "pending_customer");
}

// ---------------------------------------------------------------------------
// Status lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_status_update_writes_history(pool: PgPool) {
    let admin = admin(&pool).await;
    let a = student(&pool, "a@example.com").await;
    let b = student(&pool, "b@example.com").await;

    let updated = ProfileRepo::bulk_update_status(
        &pool,
        &[a.id, b.id, 424_242],
        "inactive_customer",
        Some("Term ended"),
        admin.id,
    )
    .await
    .unwrap();
    assert_eq!(updated, 2);

    for id in [a.id, b.id] {
        let p = ProfileRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(p.status, "inactive_customer");
        let history = ProfileRepo::list_status_history(&pool, Some(id), 20)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason.as_deref(), Some("Term ended"));
        assert_eq!(history[0].changed_by, Some(admin.id));
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_status_update_with_no_matches(pool: PgPool) {
    let admin = admin(&pool).await;
    let updated = ProfileRepo::bulk_update_status(&pool, &[1_000_001], "customer", None, admin.id)
        .await
        .unwrap();
    assert_eq!(updated, 0);
    let history = ProfileRepo::list_status_history(&pool, None, 20).await.unwrap();
    assert!(history.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expired_pending_users(pool: PgPool) {
    let old = student(&pool, "old@example.com").await;
    let fresh = student(&pool, "fresh@example.com").await;
    let paid = student(&pool, "paid@example.com").await;

    sqlx::query("UPDATE profiles SET created_at = NOW() - INTERVAL '20 days' WHERE id = ANY($1)")
        .bind(vec![old.id, paid.id])
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE profiles SET status = 'customer' WHERE id = $1")
        .bind(paid.id)
        .execute(&pool)
        .await
        .unwrap();

    let cutoff = expired_pending_cutoff(now(), 14);
    let expired = ProfileRepo::list_expired_pending(&pool, cutoff).await.unwrap();
    let ids: Vec<i64> = expired.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![old.id]);
    assert!(!ids.contains(&fresh.id));
}
