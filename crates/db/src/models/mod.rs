//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod attendance;
pub mod availability;
pub mod booking;
pub mod cohort;
pub mod consult_slot;
pub mod event;
pub mod notification_preference;
pub mod parent_link;
pub mod profile;
pub mod program;
pub mod reminder;
pub mod report;
pub mod reschedule;
pub mod token;
pub mod waitlist;
