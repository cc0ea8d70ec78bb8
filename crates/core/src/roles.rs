//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `profiles.role`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TUTOR: &str = "tutor";
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_PARENT: &str = "parent";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_TUTOR, ROLE_STUDENT, ROLE_PARENT];

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}
