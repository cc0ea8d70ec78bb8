pub mod attendance;
pub mod bookings;
pub mod calendar;
pub mod cohorts;
pub mod consults;
pub mod events;
pub mod me;
pub mod not_attending;
pub mod programs;
pub mod reports;
pub mod reschedule;
pub mod tutor;
pub mod users;
pub mod waitlist;
