//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use chrono::{Duration, SubsecRound, Utc};
use sqlx::PgPool;
use tutorhub_core::types::{DbId, Timestamp};
use tutorhub_db::models::cohort::{Cohort, CreateCohort};
use tutorhub_db::models::event::{CreateEvent, Event};
use tutorhub_db::models::profile::{CreateProfile, Profile};
use tutorhub_db::models::program::{CreateProgram, Program};
use tutorhub_db::repositories::{CohortRepo, EventRepo, ProfileRepo, ProgramRepo};

pub async fn profile(pool: &PgPool, email: &str, role: &str) -> Profile {
    ProfileRepo::create(
        pool,
        &CreateProfile {
            email: email.to_string(),
            full_name: Some(email.split('@').next().unwrap_or(email).to_string()),
            timezone: None,
            role: role.to_string(),
            status: None,
        },
    )
    .await
    .unwrap()
}

pub async fn admin(pool: &PgPool) -> Profile {
    profile(pool, "admin@example.com", "admin").await
}

pub async fn student(pool: &PgPool, email: &str) -> Profile {
    profile(pool, email, "student").await
}

pub async fn program(pool: &PgPool, name: &str) -> Program {
    ProgramRepo::create(
        pool,
        &CreateProgram {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
}

pub async fn cohort(pool: &PgPool, program_id: DbId, name: &str) -> Cohort {
    CohortRepo::create(
        pool,
        &CreateCohort {
            program_id,
            name: name.to_string(),
            color: None,
            capacity: None,
            stable_meet_link: None,
        },
    )
    .await
    .unwrap()
}

pub fn event_input(event_type: &str, start_time: Timestamp) -> CreateEvent {
    CreateEvent {
        cohort_id: None,
        program_id: None,
        title: format!("{event_type} session"),
        description: None,
        start_time,
        end_time: start_time + Duration::hours(1),
        event_type: event_type.to_string(),
        is_required: None,
        capacity: None,
        recurrence_pattern: None,
        recurrence_end_date: None,
    }
}

/// An applied event in `cohort_id` starting at `start_time`.
pub async fn applied_event(
    pool: &PgPool,
    cohort_id: DbId,
    capacity: Option<i32>,
    created_by: DbId,
    start_time: Timestamp,
) -> Event {
    let mut input = event_input("applied", start_time);
    input.cohort_id = Some(cohort_id);
    input.capacity = capacity;
    EventRepo::create(pool, &input, created_by).await.unwrap().event
}

/// Current time truncated to whole seconds, so values survive a database
/// round trip unchanged.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(0)
}

pub fn in_days(days: i64) -> Timestamp {
    now() + Duration::days(days)
}
