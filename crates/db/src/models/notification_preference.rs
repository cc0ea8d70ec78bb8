use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::types::DbId;

/// A row from the `notification_preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub user_id: DbId,
    pub email_reminders: bool,
    pub reminder_24h: bool,
    pub reminder_1h: bool,
}

impl NotificationPreference {
    /// Preferences for a user who has never saved any: everything on.
    pub fn defaults_for(user_id: DbId) -> Self {
        Self {
            user_id,
            email_reminders: true,
            reminder_24h: true,
            reminder_1h: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNotificationPreference {
    pub email_reminders: Option<bool>,
    pub reminder_24h: Option<bool>,
    pub reminder_1h: Option<bool>,
}
