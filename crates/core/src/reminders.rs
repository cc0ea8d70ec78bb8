//! Event reminder windows.
//!
//! The scheduler runs on a fixed tick, so each reminder kind matches events
//! starting inside a band around its nominal lead time. Bands are wider than
//! the tick interval; duplicate sends are prevented by the `event_reminders`
//! table, not by the window.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReminderKind {
    #[serde(rename = "24h")]
    DayBefore,
    #[serde(rename = "1h")]
    HourBefore,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 2] = [ReminderKind::DayBefore, ReminderKind::HourBefore];

    /// Value stored in `event_reminders.reminder_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "24h",
            ReminderKind::HourBefore => "1h",
        }
    }

    /// Lower and upper lead times, measured from now.
    pub fn lead_range(self) -> (Duration, Duration) {
        match self {
            ReminderKind::DayBefore => (Duration::hours(23), Duration::hours(25)),
            ReminderKind::HourBefore => (Duration::minutes(50), Duration::minutes(70)),
        }
    }

    /// Absolute `[from, to)` start-time window for events due this reminder.
    pub fn window(self, now: Timestamp) -> (Timestamp, Timestamp) {
        let (lo, hi) = self.lead_range();
        (now + lo, now + hi)
    }

    /// Human phrase used in the email body.
    pub fn lead_phrase(self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "tomorrow",
            ReminderKind::HourBefore => "in 1 hour",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_day_before_window() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap();
        let (from, to) = ReminderKind::DayBefore.window(now);
        assert_eq!(from, Utc.with_ymd_and_hms(2026, 2, 11, 8, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2026, 2, 11, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_hour_before_window() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap();
        let (from, to) = ReminderKind::HourBefore.window(now);
        assert_eq!(from, Utc.with_ymd_and_hms(2026, 2, 10, 9, 50, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2026, 2, 10, 10, 10, 0).unwrap());
    }

    #[test]
    fn test_kind_strings() {
        assert_eq!(ReminderKind::DayBefore.as_str(), "24h");
        assert_eq!(ReminderKind::HourBefore.as_str(), "1h");
        assert_eq!(
            serde_json::to_string(&ReminderKind::HourBefore).unwrap(),
            "\"1h\""
        );
    }
}
