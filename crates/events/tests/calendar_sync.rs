//! Calendar sync against an in-memory provider.

mod common;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use sqlx::PgPool;
use tutorhub_db::repositories::{BookingRepo, CohortRepo, EventRepo};
use tutorhub_events::calendar::{
    CalendarError, CalendarEventRequest, CalendarProvider, CalendarSync, SyncedEvent,
};

use common::*;

#[derive(Default)]
struct FakeCalendar {
    requests: Mutex<Vec<CalendarEventRequest>>,
    known: Mutex<HashSet<String>>,
    next_id: Mutex<u32>,
}

impl FakeCalendar {
    fn forget(&self, external_id: &str) {
        self.known.lock().unwrap().remove(external_id);
    }

    fn last_request(&self) -> CalendarEventRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl CalendarProvider for FakeCalendar {
    async fn upsert_event(
        &self,
        request: &CalendarEventRequest,
    ) -> Result<SyncedEvent, CalendarError> {
        self.requests.lock().unwrap().push(request.clone());
        let external_id = match &request.external_id {
            Some(id) => id.clone(),
            None => {
                let mut next = self.next_id.lock().unwrap();
                *next += 1;
                format!("ext-{next}")
            }
        };
        self.known.lock().unwrap().insert(external_id.clone());
        Ok(SyncedEvent {
            meet_link: request
                .create_meet_link
                .then(|| format!("https://meet.example.com/{external_id}")),
            external_id,
        })
    }

    async fn event_exists(&self, external_id: &str) -> Result<bool, CalendarError> {
        Ok(self.known.lock().unwrap().contains(external_id))
    }

    async fn create_meet_link(&self, title: &str) -> Result<String, CalendarError> {
        Ok(format!("https://meet.example.com/{}", title.replace(' ', "-")))
    }
}

fn sync(pool: &PgPool) -> (CalendarSync, Arc<FakeCalendar>) {
    let provider = Arc::new(FakeCalendar::default());
    (CalendarSync::new(pool.clone(), provider.clone()), provider)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_sync_stores_external_id_and_attendees(pool: PgPool) {
    let admin = profile(&pool, "admin@example.com", "admin").await;
    let student = profile(&pool, "s@example.com", "student").await;
    let c = cohort(&pool, "A", Some("https://meet.example.com/cohort-a")).await;
    let e = event(&pool, "applied", Some(c.id), now() + Duration::days(3), admin.id).await;
    BookingRepo::book(&pool, e.id, student.id, now()).await.unwrap();

    let (sync, provider) = sync(&pool);
    let synced = sync.sync_event(e.id).await.unwrap().unwrap();

    let stored = EventRepo::find_by_id(&pool, e.id).await.unwrap().unwrap();
    assert_eq!(stored.external_calendar_id.as_deref(), Some(synced.external_id.as_str()));

    let request = provider.last_request();
    assert_eq!(request.attendees, vec!["s@example.com".to_string()]);
    assert!(!request.create_meet_link);
    assert!(request
        .description
        .unwrap()
        .contains("https://meet.example.com/cohort-a"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_resync_updates_existing_entry(pool: PgPool) {
    let admin = profile(&pool, "admin@example.com", "admin").await;
    let c = cohort(&pool, "A", None).await;
    let e = event(&pool, "applied", Some(c.id), now() + Duration::days(3), admin.id).await;

    let (sync, provider) = sync(&pool);
    let first = sync.sync_event(e.id).await.unwrap().unwrap();
    let second = sync.sync_event(e.id).await.unwrap().unwrap();

    assert_eq!(first.external_id, second.external_id);
    assert_eq!(provider.last_request().external_id, Some(first.external_id));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_consult_sync_stores_meet_link(pool: PgPool) {
    let admin = profile(&pool, "admin@example.com", "admin").await;
    let e = event(&pool, "consult", None, now() + Duration::days(2), admin.id).await;

    let (sync, _) = sync(&pool);
    let synced = sync.sync_event(e.id).await.unwrap().unwrap();

    let stored = EventRepo::find_by_id(&pool, e.id).await.unwrap().unwrap();
    assert!(synced.meet_link.is_some());
    assert_eq!(stored.meet_link, synced.meet_link);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_sync_missing_event_returns_none(pool: PgPool) {
    let (sync, _) = sync(&pool);
    assert!(sync.sync_event(999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cohort_meet_link_is_created_once(pool: PgPool) {
    let c = cohort(&pool, "Year 10", None).await;
    let (sync, _) = sync(&pool);

    let first = sync.ensure_cohort_meet_link(c.id).await.unwrap().unwrap();
    let second = sync.ensure_cohort_meet_link(c.id).await.unwrap().unwrap();
    assert_eq!(first, second);

    let stored = CohortRepo::find_by_id(&pool, c.id).await.unwrap().unwrap();
    assert_eq!(stored.stable_meet_link, Some(first));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reconcile_recreates_missing_events_only(pool: PgPool) {
    let admin = profile(&pool, "admin@example.com", "admin").await;
    let c = cohort(&pool, "A", None).await;
    let kept = event(&pool, "applied", Some(c.id), now() + Duration::days(3), admin.id).await;
    let lost = event(&pool, "applied", Some(c.id), now() + Duration::days(4), admin.id).await;

    let (sync, provider) = sync(&pool);
    sync.sync_event(kept.id).await.unwrap();
    let lost_synced = sync.sync_event(lost.id).await.unwrap().unwrap();
    provider.forget(&lost_synced.external_id);

    let reconciled = sync.reconcile(now()).await.unwrap();
    assert_eq!(reconciled, vec![lost.id]);

    let stored = EventRepo::find_by_id(&pool, lost.id).await.unwrap().unwrap();
    let new_id = stored.external_calendar_id.unwrap();
    assert_ne!(new_id, lost_synced.external_id);
    assert!(provider.event_exists(&new_id).await.unwrap());
}
