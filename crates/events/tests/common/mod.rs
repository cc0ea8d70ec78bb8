//! Shared fixtures for event-crate integration tests.

#![allow(dead_code)]

use chrono::{Duration, SubsecRound, Utc};
use sqlx::PgPool;
use tutorhub_core::types::{DbId, Timestamp};
use tutorhub_db::models::cohort::{Cohort, CreateCohort};
use tutorhub_db::models::event::{CreateEvent, Event};
use tutorhub_db::models::profile::{CreateProfile, Profile};
use tutorhub_db::models::program::CreateProgram;
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

pub async fn cohort(pool: &PgPool, name: &str, meet_link: Option<&str>) -> Cohort {
    let program = ProgramRepo::create(
        pool,
        &CreateProgram {
            name: format!("{name} program"),
            description: None,
        },
    )
    .await
    .unwrap();
    CohortRepo::create(
        pool,
        &CreateCohort {
            program_id: program.id,
            name: name.to_string(),
            color: None,
            capacity: None,
            stable_meet_link: meet_link.map(str::to_string),
        },
    )
    .await
    .unwrap()
}

pub async fn event(
    pool: &PgPool,
    event_type: &str,
    cohort_id: Option<DbId>,
    start_time: Timestamp,
    created_by: DbId,
) -> Event {
    let input = CreateEvent {
        cohort_id,
        program_id: None,
        title: format!("{event_type} session"),
        description: None,
        start_time,
        end_time: start_time + Duration::hours(1),
        event_type: event_type.to_string(),
        is_required: None,
        capacity: Some(1).filter(|_| event_type == "consult"),
        recurrence_pattern: None,
        recurrence_end_date: None,
    };
    EventRepo::create(pool, &input, created_by).await.unwrap().event
}

pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(0)
}
