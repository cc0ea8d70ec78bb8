//! Reschedule request state machine.
//!
//! ```text
//! pending -> approved   (terminal)
//! pending -> denied     (terminal)
//! ```
//!
//! Cancelling a pending request deletes it; there is no `cancelled` state.
//! A decision is advisory: it never moves the event itself.

pub const RESCHEDULE_PENDING: &str = "pending";
pub const RESCHEDULE_APPROVED: &str = "approved";
pub const RESCHEDULE_DENIED: &str = "denied";

/// All valid reschedule request statuses.
pub const VALID_RESCHEDULE_STATUSES: &[&str] =
    &[RESCHEDULE_PENDING, RESCHEDULE_APPROVED, RESCHEDULE_DENIED];

/// Statuses an admin or tutor may hand down.
pub const VALID_RESCHEDULE_DECISIONS: &[&str] = &[RESCHEDULE_APPROVED, RESCHEDULE_DENIED];

/// Maximum length for request notes and admin notes.
pub const MAX_NOTES_LEN: usize = 2000;

pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_RESCHEDULE_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid reschedule status '{status}'. Must be one of: {}",
            VALID_RESCHEDULE_STATUSES.join(", ")
        ))
    }
}

/// Validate that a decision is `approved` or `denied`.
pub fn validate_decision(decision: &str) -> Result<(), String> {
    if VALID_RESCHEDULE_DECISIONS.contains(&decision) {
        Ok(())
    } else {
        Err(format!(
            "Invalid decision '{decision}'. Must be one of: {}",
            VALID_RESCHEDULE_DECISIONS.join(", ")
        ))
    }
}

/// Whether a request in `from` may move to `to`.
pub fn can_transition(from: &str, to: &str) -> bool {
    from == RESCHEDULE_PENDING && VALID_RESCHEDULE_DECISIONS.contains(&to)
}

/// Only pending requests can be withdrawn by the requester.
pub fn can_cancel(status: &str) -> bool {
    status == RESCHEDULE_PENDING
}

pub fn validate_notes(notes: Option<&str>) -> Result<(), String> {
    match notes {
        Some(n) if n.len() > MAX_NOTES_LEN => {
            Err(format!("Notes must be at most {MAX_NOTES_LEN} characters"))
        }
        _ => Ok(()),
    }
}
