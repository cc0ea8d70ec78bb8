//! External calendar synchronisation.
//!
//! The platform pushes its events to an external calendar through the
//! [`CalendarProvider`] trait. [`HttpCalendarProvider`] talks to a calendar
//! bridge over JSON/HTTP; [`CalendarSync`] loads events from the database,
//! pushes them, and records the external id. Sync is best-effort: failures
//! are logged and never propagate to the request that caused them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tutorhub_core::event_types::EVENT_TYPE_CONSULT;
use tutorhub_core::types::{DbId, Timestamp};
use tutorhub_db::models::event::Event;
use tutorhub_db::repositories::{BookingRepo, CohortRepo, EventRepo};
use tutorhub_db::DbPool;

use crate::bus::{self, DomainEvent};

/// HTTP request timeout for a single bridge call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Calendar request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Calendar bridge returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// What gets pushed to the external calendar for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEventRequest {
    /// Set when updating an event that was synced before.
    pub external_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub attendees: Vec<String>,
    /// Ask the provider to attach a fresh video-meeting link.
    pub create_meet_link: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedEvent {
    pub external_id: String,
    pub meet_link: Option<String>,
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Create the event, or update it when `external_id` is set.
    async fn upsert_event(&self, request: &CalendarEventRequest)
        -> Result<SyncedEvent, CalendarError>;

    async fn event_exists(&self, external_id: &str) -> Result<bool, CalendarError>;

    /// Create a standing meeting link, e.g. for a cohort.
    async fn create_meet_link(&self, title: &str) -> Result<String, CalendarError>;
}

// ---------------------------------------------------------------------------
// HttpCalendarProvider
// ---------------------------------------------------------------------------

/// Calendar bridge configuration.
///
/// | Variable              | Required | Default            |
/// |-----------------------|----------|--------------------|
/// | `CALENDAR_SYNC_URL`   | yes      | (sync disabled)    |
/// | `CALENDAR_SYNC_TOKEN` | no       |                    |
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl CalendarConfig {
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("CALENDAR_SYNC_URL").ok()?;
        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: std::env::var("CALENDAR_SYNC_TOKEN").ok(),
        })
    }
}

#[derive(Deserialize)]
struct MeetLinkResponse {
    meet_link: String,
}

pub struct HttpCalendarProvider {
    client: reqwest::Client,
    config: CalendarConfig,
}

impl HttpCalendarProvider {
    pub fn new(config: CalendarConfig) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl CalendarProvider for HttpCalendarProvider {
    async fn upsert_event(
        &self,
        request: &CalendarEventRequest,
    ) -> Result<SyncedEvent, CalendarError> {
        let builder = match &request.external_id {
            Some(id) => self
                .client
                .put(format!("{}/events/{id}", self.config.base_url)),
            None => self.client.post(format!("{}/events", self.config.base_url)),
        };
        let response = self.authorize(builder).json(request).send().await?;
        if !response.status().is_success() {
            return Err(CalendarError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.json::<SyncedEvent>().await?)
    }

    async fn event_exists(&self, external_id: &str) -> Result<bool, CalendarError> {
        let builder = self
            .client
            .get(format!("{}/events/{external_id}", self.config.base_url));
        let response = self.authorize(builder).send().await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND | reqwest::StatusCode::GONE => Ok(false),
            s => Err(CalendarError::HttpStatus(s.as_u16())),
        }
    }

    async fn create_meet_link(&self, title: &str) -> Result<String, CalendarError> {
        let builder = self
            .client
            .post(format!("{}/meet-links", self.config.base_url));
        let response = self
            .authorize(builder)
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CalendarError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.json::<MeetLinkResponse>().await?.meet_link)
    }
}

// ---------------------------------------------------------------------------
// CalendarSync
// ---------------------------------------------------------------------------

/// Domain events that change what an external calendar entry should show.
const SYNC_TRIGGERS: [&str; 4] = [
    bus::EVENT_CREATED,
    bus::EVENT_RESCHEDULED,
    bus::BOOKING_CREATED,
    bus::BOOKING_CANCELLED,
];

#[derive(Clone)]
pub struct CalendarSync {
    pool: DbPool,
    provider: Arc<dyn CalendarProvider>,
}

impl CalendarSync {
    pub fn new(pool: DbPool, provider: Arc<dyn CalendarProvider>) -> Self {
        Self { pool, provider }
    }

    /// Push one event to the calendar and store its external id.
    ///
    /// Returns `None` if the event no longer exists. Consult events get a
    /// fresh meeting link; cohort events carry the cohort's stable link in
    /// their description.
    pub async fn sync_event(&self, event_id: DbId) -> Result<Option<SyncedEvent>, CalendarError> {
        let Some(event) = EventRepo::find_by_id(&self.pool, event_id).await? else {
            return Ok(None);
        };
        let synced = self.push(&event, event.external_calendar_id.clone()).await?;
        Ok(Some(synced))
    }

    /// Return the cohort's stable meeting link, creating it on first use.
    ///
    /// Returns `None` if the cohort does not exist.
    pub async fn ensure_cohort_meet_link(
        &self,
        cohort_id: DbId,
    ) -> Result<Option<String>, CalendarError> {
        let Some(cohort) = CohortRepo::find_by_id(&self.pool, cohort_id).await? else {
            return Ok(None);
        };
        if let Some(link) = cohort.stable_meet_link {
            return Ok(Some(link));
        }

        let link = self
            .provider
            .create_meet_link(&format!("{} - Stable Meeting", cohort.name))
            .await?;
        CohortRepo::set_stable_meet_link(&self.pool, cohort_id, &link).await?;
        tracing::info!(cohort_id, "Created cohort meeting link");
        Ok(Some(link))
    }

    /// Re-create every upcoming synced event the calendar no longer knows.
    ///
    /// Returns the ids of the events that were re-created. A failure on one
    /// event is logged and does not stop the sweep.
    pub async fn reconcile(&self, now: Timestamp) -> Result<Vec<DbId>, CalendarError> {
        let events = EventRepo::list_synced(&self.pool, now).await?;
        let mut reconciled = Vec::new();

        for event in events {
            let Some(external_id) = event.external_calendar_id.as_deref() else {
                continue;
            };
            let outcome = match self.provider.event_exists(external_id).await {
                Ok(true) => continue,
                Ok(false) => {
                    EventRepo::set_calendar_sync(&self.pool, event.id, None, None).await?;
                    self.push(&event, None).await
                }
                Err(e) => Err(e),
            };
            match outcome {
                Ok(_) => reconciled.push(event.id),
                Err(e) => {
                    tracing::error!(
                        event_id = event.id,
                        error = %e,
                        "Failed to reconcile calendar event",
                    );
                }
            }
        }

        if !reconciled.is_empty() {
            tracing::info!(count = reconciled.len(), "Reconciled calendar events");
        }
        Ok(reconciled)
    }

    /// Follow the bus and sync every event whose calendar entry is affected.
    pub async fn run(&self, mut rx: broadcast::Receiver<DomainEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Calendar sync cancelled");
                    break;
                }
                received = rx.recv() => match received {
                    Ok(event) => self.handle(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Calendar sync lagged behind the event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }

    async fn handle(&self, event: &DomainEvent) {
        if !SYNC_TRIGGERS.contains(&event.event_type.as_str()) {
            return;
        }
        let Some(event_id) = event
            .source_entity_id
            .filter(|_| event.source_entity_type.as_deref() == Some("event"))
        else {
            return;
        };
        if let Err(e) = self.sync_event(event_id).await {
            tracing::error!(event_id, error = %e, "Calendar sync failed");
        }
    }

    async fn push(
        &self,
        event: &Event,
        external_id: Option<String>,
    ) -> Result<SyncedEvent, CalendarError> {
        let is_consult = event.event_type == EVENT_TYPE_CONSULT;

        let mut description = event.description.clone();
        if !is_consult {
            if let Some(cohort_id) = event.cohort_id {
                let link = CohortRepo::find_by_id(&self.pool, cohort_id)
                    .await?
                    .and_then(|c| c.stable_meet_link);
                if let Some(link) = link {
                    description = Some(match description {
                        Some(d) => format!("{d}\n\nJoin: {link}"),
                        None => format!("Join: {link}"),
                    });
                }
            }
        }

        let request = CalendarEventRequest {
            external_id,
            title: event.title.clone(),
            description,
            start_time: event.start_time,
            end_time: event.end_time,
            attendees: BookingRepo::list_attendee_emails(&self.pool, event.id).await?,
            create_meet_link: is_consult && event.meet_link.is_none(),
        };

        let synced = self.provider.upsert_event(&request).await?;
        let meet_link = synced.meet_link.as_deref().filter(|_| is_consult);
        EventRepo::set_calendar_sync(&self.pool, event.id, Some(&synced.external_id), meet_link)
            .await?;

        tracing::info!(
            event_id = event.id,
            external_id = %synced.external_id,
            "Event synced to calendar"
        );
        Ok(synced)
    }
}
