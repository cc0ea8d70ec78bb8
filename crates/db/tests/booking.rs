//! Integration tests for the booking ledger and consult slots.

mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use sqlx::PgPool;
use tutorhub_db::models::booking::{BookingOutcome, CancelOutcome};
use tutorhub_db::models::consult_slot::{ConsultBookingOutcome, DeleteSlotOutcome};
use tutorhub_db::repositories::{
    AttendanceRepo, BookingRepo, ConsultSlotRepo, EventRepo,
};

use common::*;

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_book_seeds_unmarked_attendance(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let event = applied_event(&pool, c.id, Some(5), admin.id, in_days(3)).await;

    let outcome = BookingRepo::book(&pool, event.id, s.id, now()).await.unwrap();
    assert_matches!(outcome, BookingOutcome::Booked(b) if b.user_id == s.id);

    let att = AttendanceRepo::find(&pool, s.id, event.id).await.unwrap().unwrap();
    assert!(att.status.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_booking_leaves_single_row(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let event = applied_event(&pool, c.id, None, admin.id, in_days(3)).await;

    BookingRepo::book(&pool, event.id, s.id, now()).await.unwrap();
    let second = BookingRepo::book(&pool, event.id, s.id, now()).await.unwrap();
    assert_matches!(second, BookingOutcome::AlreadyBooked);
    assert_eq!(BookingRepo::count_for_event(&pool, event.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_capacity_enforced(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let event = applied_event(&pool, c.id, Some(2), admin.id, in_days(3)).await;

    for i in 0..2 {
        let s = student(&pool, &format!("s{i}@example.com")).await;
        let outcome = BookingRepo::book(&pool, event.id, s.id, now()).await.unwrap();
        assert_matches!(outcome, BookingOutcome::Booked(_));
    }

    let late = student(&pool, "late@example.com").await;
    let outcome = BookingRepo::book(&pool, event.id, late.id, now()).await.unwrap();
    assert_matches!(outcome, BookingOutcome::Full { capacity: 2 });
    assert_eq!(BookingRepo::count_for_event(&pool, event.id).await.unwrap(), 2);
    assert!(AttendanceRepo::find(&pool, late.id, event.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_bookings_cannot_overbook(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let event = applied_event(&pool, c.id, Some(1), admin.id, in_days(3)).await;
    let a = student(&pool, "a@example.com").await;
    let b = student(&pool, "b@example.com").await;

    let (ra, rb) = tokio::join!(
        BookingRepo::book(&pool, event.id, a.id, now()),
        BookingRepo::book(&pool, event.id, b.id, now()),
    );
    let booked = [ra.unwrap(), rb.unwrap()]
        .iter()
        .filter(|o| matches!(o, BookingOutcome::Booked(_)))
        .count();
    assert_eq!(booked, 1);
    assert_eq!(BookingRepo::count_for_event(&pool, event.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cannot_book_started_or_missing_event(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let event = applied_event(&pool, c.id, None, admin.id, in_days(1)).await;

    let later = event.start_time + Duration::minutes(5);
    let outcome = BookingRepo::book(&pool, event.id, s.id, later).await.unwrap();
    assert_matches!(outcome, BookingOutcome::AlreadyStarted);

    let outcome = BookingRepo::book(&pool, 999_999, s.id, now()).await.unwrap();
    assert_matches!(outcome, BookingOutcome::EventNotFound);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_cancel_at_exactly_24h_succeeds(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let t0 = now();
    let event = applied_event(&pool, c.id, None, admin.id, t0 + Duration::hours(24)).await;
    BookingRepo::book(&pool, event.id, s.id, t0).await.unwrap();

    let outcome = BookingRepo::cancel(&pool, event.id, s.id, t0).await.unwrap();
    assert_matches!(outcome, CancelOutcome::Cancelled { .. });
    assert!(BookingRepo::find(&pool, event.id, s.id).await.unwrap().is_none());
    // Applied events drop the attendance row with the booking.
    assert!(AttendanceRepo::find(&pool, s.id, event.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cancel_one_second_inside_cutoff_fails(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let t0 = now();
    let start = t0 + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59);
    let event = applied_event(&pool, c.id, None, admin.id, start).await;
    BookingRepo::book(&pool, event.id, s.id, t0).await.unwrap();

    let outcome = BookingRepo::cancel(&pool, event.id, s.id, t0).await.unwrap();
    assert_matches!(outcome, CancelOutcome::TooLate);
    assert!(BookingRepo::find(&pool, event.id, s.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cancel_without_booking(pool: PgPool) {
    let admin = admin(&pool).await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let s = student(&pool, "s@example.com").await;
    let event = applied_event(&pool, c.id, None, admin.id, in_days(5)).await;

    let outcome = BookingRepo::cancel(&pool, event.id, s.id, now()).await.unwrap();
    assert_matches!(outcome, CancelOutcome::NotBooked);
}

// ---------------------------------------------------------------------------
// Consults
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_book_consult_creates_event_and_flips_slot(pool: PgPool) {
    let tutor = profile(&pool, "ada@example.com", "tutor").await;
    let s = student(&pool, "s@example.com").await;
    let start = in_days(2);
    let slot = ConsultSlotRepo::create(&pool, tutor.id, start, start + Duration::minutes(30))
        .await
        .unwrap();

    let outcome = ConsultSlotRepo::book(&pool, slot.id, s.id, now()).await.unwrap();
    let ConsultBookingOutcome::Booked { event, booking } = outcome else {
        panic!("expected booking, got {outcome:?}");
    };
    assert_eq!(event.event_type, "consult");
    assert_eq!(event.capacity, Some(1));
    assert_eq!(event.title, "Consult with ada");
    assert_eq!(event.start_time, start);
    assert_eq!(booking.user_id, s.id);

    let slot = ConsultSlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert!(slot.is_booked);
    assert_eq!(slot.event_id, Some(event.id));
    assert_eq!(slot.booked_by, Some(s.id));

    let again = ConsultSlotRepo::book(&pool, slot.id, s.id, now()).await.unwrap();
    assert_matches!(again, ConsultBookingOutcome::AlreadyBooked);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_consult_bookings_single_winner(pool: PgPool) {
    let tutor = profile(&pool, "t@example.com", "tutor").await;
    let a = student(&pool, "a@example.com").await;
    let b = student(&pool, "b@example.com").await;
    let start = in_days(2);
    let slot = ConsultSlotRepo::create(&pool, tutor.id, start, start + Duration::minutes(30))
        .await
        .unwrap();

    let (ra, rb) = tokio::join!(
        ConsultSlotRepo::book(&pool, slot.id, a.id, now()),
        ConsultSlotRepo::book(&pool, slot.id, b.id, now()),
    );
    let winners = [ra.unwrap(), rb.unwrap()]
        .iter()
        .filter(|o| matches!(o, ConsultBookingOutcome::Booked { .. }))
        .count();
    assert_eq!(winners, 1);

    let (events,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM events WHERE event_type = 'consult'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(events, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cancel_consult_frees_slot_and_deletes_event(pool: PgPool) {
    let tutor = profile(&pool, "t@example.com", "tutor").await;
    let s = student(&pool, "s@example.com").await;
    let start = in_days(3);
    let slot = ConsultSlotRepo::create(&pool, tutor.id, start, start + Duration::minutes(30))
        .await
        .unwrap();
    let ConsultBookingOutcome::Booked { event, .. } =
        ConsultSlotRepo::book(&pool, slot.id, s.id, now()).await.unwrap()
    else {
        panic!("expected booking");
    };

    let outcome = BookingRepo::cancel(&pool, event.id, s.id, now()).await.unwrap();
    assert_matches!(
        outcome,
        CancelOutcome::Cancelled { ref event_type } if event_type == "consult"
    );

    assert!(EventRepo::find_by_id(&pool, event.id).await.unwrap().is_none());
    let slot = ConsultSlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert!(!slot.is_booked);
    assert_eq!(slot.event_id, None);

    let available = ConsultSlotRepo::list_available(&pool, now(), in_days(28))
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_moving_consult_event_moves_its_slot(pool: PgPool) {
    let tutor = profile(&pool, "t@example.com", "tutor").await;
    let s = student(&pool, "s@example.com").await;
    let start = in_days(3);
    let slot = ConsultSlotRepo::create(&pool, tutor.id, start, start + Duration::minutes(30))
        .await
        .unwrap();
    let ConsultBookingOutcome::Booked { event, .. } =
        ConsultSlotRepo::book(&pool, slot.id, s.id, now()).await.unwrap()
    else {
        panic!("expected booking");
    };

    let moved = in_days(5);
    let updated = EventRepo::update_time(&pool, event.id, moved, moved + Duration::minutes(45))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.start_time, moved);

    let synced = ConsultSlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(synced.start_time, moved);
    assert_eq!(synced.end_time, moved + Duration::minutes(45));

    // Freed again on cancel, at the new time rather than the old one.
    BookingRepo::cancel(&pool, event.id, s.id, now()).await.unwrap();
    let available = ConsultSlotRepo::list_available(&pool, now(), in_days(28))
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].start_time, moved);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_moving_applied_event_leaves_slots_alone(pool: PgPool) {
    let admin = admin(&pool).await;
    let tutor = profile(&pool, "t@example.com", "tutor").await;
    let prog = program(&pool, "P").await;
    let c = cohort(&pool, prog.id, "A").await;
    let start = in_days(3);
    let slot = ConsultSlotRepo::create(&pool, tutor.id, start, start + Duration::minutes(30))
        .await
        .unwrap();
    let event = applied_event(&pool, c.id, None, admin.id, start).await;

    let moved = in_days(6);
    EventRepo::update_time(&pool, event.id, moved, moved + Duration::hours(1))
        .await
        .unwrap()
        .unwrap();

    let untouched = ConsultSlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(untouched.start_time, start);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_event_frees_consult_slot(pool: PgPool) {
    let tutor = profile(&pool, "t@example.com", "tutor").await;
    let s = student(&pool, "s@example.com").await;
    let start = in_days(3);
    let slot = ConsultSlotRepo::create(&pool, tutor.id, start, start + Duration::minutes(30))
        .await
        .unwrap();
    let ConsultBookingOutcome::Booked { event, .. } =
        ConsultSlotRepo::book(&pool, slot.id, s.id, now()).await.unwrap()
    else {
        panic!("expected booking");
    };

    assert!(EventRepo::delete(&pool, event.id).await.unwrap());
    let slot = ConsultSlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert!(!slot.is_booked);
    assert!(BookingRepo::find(&pool, event.id, s.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_available_slots_window(pool: PgPool) {
    let tutor = profile(&pool, "t@example.com", "tutor").await;
    for days in [1, 10, 40] {
        let start = in_days(days);
        ConsultSlotRepo::create(&pool, tutor.id, start, start + Duration::minutes(30))
            .await
            .unwrap();
    }
    let past = now() - Duration::days(1);
    ConsultSlotRepo::create(&pool, tutor.id, past, past + Duration::minutes(30))
        .await
        .unwrap();

    let available = ConsultSlotRepo::list_available(&pool, now(), in_days(28))
        .await
        .unwrap();
    assert_eq!(available.len(), 2);
    assert_eq!(available[0].tutor_name.as_deref(), Some("t"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_booked_slot_cannot_be_deleted(pool: PgPool) {
    let tutor = profile(&pool, "t@example.com", "tutor").await;
    let s = student(&pool, "s@example.com").await;
    let start = in_days(3);
    let slot = ConsultSlotRepo::create(&pool, tutor.id, start, start + Duration::minutes(30))
        .await
        .unwrap();
    let free = ConsultSlotRepo::create(&pool, tutor.id, start, start + Duration::minutes(30))
        .await
        .unwrap();
    ConsultSlotRepo::book(&pool, slot.id, s.id, now()).await.unwrap();

    assert_eq!(
        ConsultSlotRepo::delete_unbooked(&pool, slot.id).await.unwrap(),
        DeleteSlotOutcome::Booked
    );
    assert_eq!(
        ConsultSlotRepo::delete_unbooked(&pool, free.id).await.unwrap(),
        DeleteSlotOutcome::Deleted
    );
    assert_eq!(
        ConsultSlotRepo::delete_unbooked(&pool, free.id).await.unwrap(),
        DeleteSlotOutcome::NotFound
    );
}
