//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: the principal from a JWT Bearer token.
//! - [`rbac::RequireAdmin`]: requires the `admin` role.
//! - [`rbac::RequireStaff`]: requires `admin` or `tutor`.
//! - [`rbac::RequireAuth`]: any authenticated principal.

pub mod auth;
pub mod rbac;
