//! Authentication primitives.
//!
//! Identity is owned by an external provider; this API only verifies the
//! HS256 bearer tokens it issues. See [`jwt`].

pub mod jwt;
