use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The event has no seats left.
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// A business policy (such as the cancellation window) forbids the action.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// A time-limited capability is past its expiry.
    #[error("Expired: {0}")]
    Expired(String),

    /// No authenticated principal.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but lacking the role or ownership required.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Convert a validation message from one of the `validate_*` helpers.
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }
}
