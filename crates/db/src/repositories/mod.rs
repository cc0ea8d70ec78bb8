//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod attendance_repo;
pub mod availability_repo;
pub mod booking_repo;
pub mod cohort_repo;
pub mod consult_slot_repo;
pub mod event_repo;
pub mod notification_preference_repo;
pub mod parent_link_repo;
pub mod profile_repo;
pub mod program_repo;
pub mod reminder_repo;
pub mod report_repo;
pub mod reschedule_repo;
pub mod token_repo;
pub mod waitlist_repo;

pub use attendance_repo::AttendanceRepo;
pub use availability_repo::AvailabilityRepo;
pub use booking_repo::BookingRepo;
pub use cohort_repo::CohortRepo;
pub use consult_slot_repo::ConsultSlotRepo;
pub use event_repo::EventRepo;
pub use notification_preference_repo::NotificationPreferenceRepo;
pub use parent_link_repo::ParentLinkRepo;
pub use profile_repo::ProfileRepo;
pub use program_repo::ProgramRepo;
pub use reminder_repo::ReminderRepo;
pub use report_repo::ReportRepo;
pub use reschedule_repo::RescheduleRepo;
pub use token_repo::TokenRepo;
pub use waitlist_repo::WaitlistRepo;
