//! Event-to-email routing.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::broadcast;
use tutorhub_core::types::{DbId, Timestamp};
use tutorhub_db::models::cohort::Cohort;
use tutorhub_db::models::profile::Profile;
use tutorhub_db::repositories::{CohortRepo, EventRepo, ProfileRepo, ProgramRepo};
use tutorhub_db::DbPool;
use tutorhub_events::bus::{BOOKING_CREATED, PAYMENT_REMINDER, RESCHEDULE_HANDLED, WAITLIST_PLACED};
use tutorhub_events::delivery::email::EmailError;
use tutorhub_events::templates::{
    format_date, format_time, BookingConfirmation, EmailTemplate, PaymentReminder,
    RescheduleUpdate,
};
use tutorhub_events::{DomainEvent, EmailDelivery};

const DEFAULT_RECIPIENT_NAME: &str = "there";
const DASHBOARD_PATH: &str = "/dashboard";
const PAYMENT_PATH: &str = "/payment";

#[derive(Debug, thiserror::Error)]
enum DispatchError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Email(#[from] EmailError),
}

#[derive(Debug, Deserialize)]
struct ReschedulePayload {
    event_id: DbId,
    status: String,
    admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentBatch {
    reminders: Vec<PaymentDue>,
}

#[derive(Debug, Deserialize)]
struct PaymentDue {
    user_id: DbId,
    days_remaining: i64,
}

/// Sends notification emails for domain events.
pub struct EmailDispatcher {
    pool: DbPool,
    email: Arc<EmailDelivery>,
    app_url: String,
}

impl EmailDispatcher {
    pub fn new(pool: DbPool, email: Arc<EmailDelivery>, app_url: String) -> Self {
        Self {
            pool,
            email,
            app_url,
        }
    }

    /// Consume the bus until it closes. Delivery failures are logged and the
    /// event is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.dispatch(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to send notification email"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Email dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, email dispatcher shutting down");
                    break;
                }
            }
        }
    }

    async fn dispatch(&self, event: &DomainEvent) -> Result<(), DispatchError> {
        if event.event_type == PAYMENT_REMINDER {
            return self.payment_reminders(event).await;
        }
        let Some(recipient_id) = event.recipient() else {
            return Ok(());
        };

        let template = match event.event_type.as_str() {
            BOOKING_CREATED => self.booking_confirmation(event, recipient_id).await?,
            WAITLIST_PLACED => self.placement_confirmation(event, recipient_id).await?,
            RESCHEDULE_HANDLED => self.reschedule_update(event, recipient_id).await?,
            _ => return Ok(()),
        };
        let Some((profile, template)) = template else {
            return Ok(());
        };
        self.send(event, &profile, &template).await
    }

    async fn send(
        &self,
        event: &DomainEvent,
        profile: &Profile,
        template: &EmailTemplate,
    ) -> Result<(), DispatchError> {
        let rendered = template.render();
        self.email.send(&profile.email, &rendered).await?;

        tracing::info!(
            template = template.name(),
            user_id = profile.id,
            event_type = %event.event_type,
            "Notification email sent"
        );
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.app_url)
    }

    async fn cohort_details(
        &self,
        cohort_id: Option<DbId>,
    ) -> Result<(Option<Cohort>, Option<String>), sqlx::Error> {
        let Some(cohort_id) = cohort_id else {
            return Ok((None, None));
        };
        let Some(cohort) = CohortRepo::find_by_id(&self.pool, cohort_id).await? else {
            return Ok((None, None));
        };
        let program_name = ProgramRepo::find_by_id(&self.pool, cohort.program_id)
            .await?
            .map(|p| p.name);
        Ok((Some(cohort), program_name))
    }

    async fn booking_confirmation(
        &self,
        event: &DomainEvent,
        recipient_id: DbId,
    ) -> Result<Option<(Profile, EmailTemplate)>, sqlx::Error> {
        let Some(event_id) = event.source_entity_id else {
            return Ok(None);
        };
        let Some(booked) = EventRepo::find_by_id(&self.pool, event_id).await? else {
            return Ok(None);
        };
        let Some(profile) = ProfileRepo::find_by_id(&self.pool, recipient_id).await? else {
            return Ok(None);
        };
        let (cohort, program_name) = self.cohort_details(booked.cohort_id).await?;

        let meet_link = booked
            .meet_link
            .clone()
            .or_else(|| cohort.as_ref().and_then(|c| c.stable_meet_link.clone()));

        let template = EmailTemplate::BookingConfirmation(BookingConfirmation {
            recipient_name: recipient_name(&profile),
            title: booked.title,
            color: cohort.map(|c| c.color),
            program_name,
            schedule: schedule_line(booked.start_time, booked.end_time),
            meet_link,
            dashboard_url: self.url(DASHBOARD_PATH),
        });
        Ok(Some((profile, template)))
    }

    async fn placement_confirmation(
        &self,
        event: &DomainEvent,
        recipient_id: DbId,
    ) -> Result<Option<(Profile, EmailTemplate)>, sqlx::Error> {
        let (Some(cohort), program_name) = self.cohort_details(event.source_entity_id).await?
        else {
            return Ok(None);
        };
        let Some(profile) = ProfileRepo::find_by_id(&self.pool, recipient_id).await? else {
            return Ok(None);
        };

        let template = EmailTemplate::BookingConfirmation(BookingConfirmation {
            recipient_name: recipient_name(&profile),
            title: cohort.name,
            color: Some(cohort.color),
            program_name,
            schedule: "Your upcoming sessions are listed on your dashboard.".to_string(),
            meet_link: cohort.stable_meet_link,
            dashboard_url: self.url(DASHBOARD_PATH),
        });
        Ok(Some((profile, template)))
    }

    async fn reschedule_update(
        &self,
        event: &DomainEvent,
        recipient_id: DbId,
    ) -> Result<Option<(Profile, EmailTemplate)>, sqlx::Error> {
        let Ok(payload) = serde_json::from_value::<ReschedulePayload>(event.payload.clone()) else {
            tracing::warn!(event_type = %event.event_type, "Malformed reschedule payload");
            return Ok(None);
        };
        let Some(profile) = ProfileRepo::find_by_id(&self.pool, recipient_id).await? else {
            return Ok(None);
        };
        let event_title = EventRepo::find_by_id(&self.pool, payload.event_id)
            .await?
            .map(|e| e.title)
            .unwrap_or_else(|| "your session".to_string());

        let template = EmailTemplate::RescheduleUpdate(RescheduleUpdate {
            recipient_name: recipient_name(&profile),
            event_title,
            status: payload.status,
            admin_notes: payload.admin_notes,
            dashboard_url: self.url(DASHBOARD_PATH),
        });
        Ok(Some((profile, template)))
    }

    /// One email per entry in the batch. A failed send is logged and the rest
    /// of the batch still goes out.
    async fn payment_reminders(&self, event: &DomainEvent) -> Result<(), DispatchError> {
        let Ok(batch) = serde_json::from_value::<PaymentBatch>(event.payload.clone()) else {
            tracing::warn!(event_type = %event.event_type, "Malformed payment reminder payload");
            return Ok(());
        };

        for due in batch.reminders {
            let Some(profile) = ProfileRepo::find_by_id(&self.pool, due.user_id).await? else {
                continue;
            };
            let name = recipient_name(&profile);
            let template = EmailTemplate::PaymentReminder(PaymentReminder {
                recipient_name: name.clone(),
                student_name: name,
                days_remaining: due.days_remaining,
                payment_url: self.url(PAYMENT_PATH),
            });
            if let Err(e) = self.send(event, &profile, &template).await {
                tracing::error!(
                    error = %e,
                    user_id = profile.id,
                    "Failed to send payment reminder"
                );
            }
        }
        Ok(())
    }
}

fn recipient_name(profile: &Profile) -> String {
    profile
        .full_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RECIPIENT_NAME.to_string())
}

/// "Tuesday, 10 February, 9:00 AM - 10:00 AM UTC".
fn schedule_line(start: Timestamp, end: Timestamp) -> String {
    format!(
        "{}, {} - {} UTC",
        format_date(start),
        format_time(start),
        format_time(end)
    )
}
