//! Customer status lifecycle.
//!
//! Any transition between the three statuses is permitted; every change made
//! through the administrative path is recorded in `user_status_history`.

use chrono::Duration;

use crate::types::Timestamp;

pub const STATUS_PENDING_CUSTOMER: &str = "pending_customer";
pub const STATUS_CUSTOMER: &str = "customer";
pub const STATUS_INACTIVE_CUSTOMER: &str = "inactive_customer";

pub const VALID_CUSTOMER_STATUSES: &[&str] = &[
    STATUS_PENDING_CUSTOMER,
    STATUS_CUSTOMER,
    STATUS_INACTIVE_CUSTOMER,
];

/// Pending customers older than this are considered expired.
pub const DEFAULT_PENDING_EXPIRY_DAYS: i64 = 14;

/// Default page size for status history listings.
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

pub fn validate_customer_status(status: &str) -> Result<(), String> {
    if VALID_CUSTOMER_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid status '{status}'. Must be one of: {}",
            VALID_CUSTOMER_STATUSES.join(", ")
        ))
    }
}

/// Profiles created before this instant are past the pending window.
pub fn expired_pending_cutoff(now: Timestamp, days: i64) -> Timestamp {
    now - Duration::days(days)
}

/// Validate the `days` argument of the expired-pending query.
pub fn validate_expiry_days(days: i64) -> Result<(), String> {
    if (1..=365).contains(&days) {
        Ok(())
    } else {
        Err(format!("days must be between 1 and 365, got {days}"))
    }
}

/// Days a pending customer has left to pay before the account lapses.
pub fn payment_days_remaining(created_at: Timestamp, now: Timestamp, days: i64) -> i64 {
    (days - (now - created_at).num_days()).max(0)
}

/// Reason recorded when expired pending customers are deactivated.
pub fn deactivation_reason(days: i64) -> String {
    format!("Payment pending for more than {days} days")
}
