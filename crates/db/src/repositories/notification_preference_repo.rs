//! Repository for the `notification_preferences` table.

use sqlx::PgPool;
use tutorhub_core::types::DbId;

use crate::models::notification_preference::{
    NotificationPreference, UpdateNotificationPreference,
};

const COLUMNS: &str = "user_id, email_reminders, reminder_24h, reminder_1h";

pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// Stored preferences, or the all-on defaults when none are saved.
    pub async fn get_or_default(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_preferences WHERE user_id = $1");
        let found = sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(found.unwrap_or_else(|| NotificationPreference::defaults_for(user_id)))
    }

    /// Create or patch a user's preferences.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdateNotificationPreference,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences
                 (user_id, email_reminders, reminder_24h, reminder_1h)
             VALUES ($1, COALESCE($2, TRUE), COALESCE($3, TRUE), COALESCE($4, TRUE))
             ON CONFLICT (user_id) DO UPDATE SET
                email_reminders = COALESCE($2, notification_preferences.email_reminders),
                reminder_24h = COALESCE($3, notification_preferences.reminder_24h),
                reminder_1h = COALESCE($4, notification_preferences.reminder_1h),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .bind(input.email_reminders)
            .bind(input.reminder_24h)
            .bind(input.reminder_1h)
            .fetch_one(pool)
            .await
    }
}
