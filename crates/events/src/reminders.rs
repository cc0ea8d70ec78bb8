//! Event reminder scheduler.
//!
//! [`ReminderScheduler`] runs as a background task. On every tick it looks
//! for bookings whose event falls inside the 24h and 1h reminder windows,
//! claims each reminder in `event_reminders`, issues a single-use
//! not-attending token and emails the reminder.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tutorhub_core::reminders::ReminderKind;
use tutorhub_core::tokens::token_expires_at;
use tutorhub_core::types::Timestamp;
use tutorhub_db::models::reminder::ReminderCandidate;
use tutorhub_db::repositories::{ReminderRepo, TokenRepo};
use tutorhub_db::DbPool;

use crate::delivery::email::{EmailDelivery, EmailError};
use crate::templates::{EmailTemplate, EventReminder};

/// Fallback greeting when a profile has no name.
const DEFAULT_RECIPIENT_NAME: &str = "Student";

#[derive(Debug, thiserror::Error)]
enum ReminderError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Email(#[from] EmailError),
}

/// Counts from a single scheduler pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReminderRun {
    pub sent: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// ReminderScheduler
// ---------------------------------------------------------------------------

pub struct ReminderScheduler {
    pool: DbPool,
    email: Arc<EmailDelivery>,
    /// Public base URL of this API, used for the not-attending link.
    api_url: String,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(
        pool: DbPool,
        email: Arc<EmailDelivery>,
        api_url: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            pool,
            email,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            interval,
        }
    }

    /// Run the scheduler loop until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match self.run_once(Utc::now()).await {
                        Ok(run) if run.sent + run.failed > 0 => {
                            tracing::info!(
                                sent = run.sent,
                                failed = run.failed,
                                "Processed event reminders",
                            );
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Failed to process event reminders"),
                    }
                }
            }
        }
    }

    /// Process both reminder windows relative to `now`.
    pub async fn run_once(&self, now: Timestamp) -> Result<ReminderRun, sqlx::Error> {
        let mut run = ReminderRun::default();

        for kind in ReminderKind::ALL {
            let (from, to) = kind.window(now);
            let due = ReminderRepo::list_due(&self.pool, kind, from, to).await?;

            for candidate in &due {
                // Claim first so overlapping ticks never double-send.
                if !ReminderRepo::mark_sent(&self.pool, candidate.event_id, candidate.user_id, kind)
                    .await?
                {
                    continue;
                }

                match self.send_reminder(candidate, kind, now).await {
                    Ok(()) => run.sent += 1,
                    Err(e) => {
                        run.failed += 1;
                        tracing::error!(
                            event_id = candidate.event_id,
                            user_id = candidate.user_id,
                            reminder = kind.as_str(),
                            error = %e,
                            "Failed to send event reminder"
                        );
                    }
                }
            }
        }

        Ok(run)
    }

    async fn send_reminder(
        &self,
        candidate: &ReminderCandidate,
        kind: ReminderKind,
        now: Timestamp,
    ) -> Result<(), ReminderError> {
        let token = TokenRepo::issue(
            &self.pool,
            candidate.user_id,
            candidate.event_id,
            token_expires_at(now),
        )
        .await?;

        let email = EmailTemplate::EventReminder(EventReminder {
            recipient_name: candidate
                .full_name
                .clone()
                .unwrap_or_else(|| DEFAULT_RECIPIENT_NAME.to_string()),
            event_title: candidate.title.clone(),
            start_time: candidate.start_time,
            time_until: kind.lead_phrase().to_string(),
            meet_link: candidate.meet_link().map(str::to_string),
            not_attending_url: Some(not_attending_url(&self.api_url, &token.id.to_string())),
        })
        .render();

        self.email.send(&candidate.email, &email).await?;
        Ok(())
    }
}

/// Link embedded in reminder emails for one-click "not attending".
pub fn not_attending_url(api_url: &str, token: &str) -> String {
    format!("{api_url}/not-attending?token={token}")
}
