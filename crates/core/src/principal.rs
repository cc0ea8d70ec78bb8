//! The acting principal threaded into every mutation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::{ROLE_ADMIN, ROLE_TUTOR};
use crate::types::DbId;

/// Authenticated caller as handed over by the identity provider.
///
/// Role claims and ids are trusted exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: DbId,
    pub role: String,
}

impl Principal {
    pub fn new(id: DbId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Admins and tutors.
    pub fn is_staff(&self) -> bool {
        self.role == ROLE_ADMIN || self.role == ROLE_TUTOR
    }

    /// Resolve the user an operation targets.
    ///
    /// Acting for yourself is always allowed; acting for someone else needs
    /// the staff role.
    pub fn acting_for(&self, user_id: Option<DbId>) -> Result<DbId, CoreError> {
        match user_id {
            None => Ok(self.id),
            Some(id) if id == self.id => Ok(id),
            Some(id) if self.is_staff() => Ok(id),
            Some(_) => Err(CoreError::Forbidden(
                "Cannot act on behalf of another user".into(),
            )),
        }
    }

    /// Like [`acting_for`](Self::acting_for) but only admins may act for others.
    pub fn acting_for_as_admin(&self, user_id: Option<DbId>) -> Result<DbId, CoreError> {
        match user_id {
            None => Ok(self.id),
            Some(id) if id == self.id || self.is_admin() => Ok(id),
            Some(_) => Err(CoreError::Forbidden(
                "Only admins may act on behalf of another user".into(),
            )),
        }
    }
}
