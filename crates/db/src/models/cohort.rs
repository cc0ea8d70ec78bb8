//! Cohort, tutor assignment, and enrollment models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `cohorts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cohort {
    pub id: DbId,
    pub program_id: DbId,
    pub name: String,
    pub color: String,
    pub capacity: i32,
    pub stable_meet_link: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cohort with its current enrollment and tutor counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CohortWithCounts {
    pub id: DbId,
    pub program_id: DbId,
    pub program_name: String,
    pub name: String,
    pub color: String,
    pub capacity: i32,
    pub stable_meet_link: Option<String>,
    pub enrolled_count: i64,
    pub tutor_count: i64,
    pub created_at: Timestamp,
}

/// DTO for creating a cohort.
///
/// `capacity` defaults to 10 and `color` is taken from the palette when
/// omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCohort {
    pub program_id: DbId,
    pub name: String,
    pub color: Option<String>,
    pub capacity: Option<i32>,
    pub stable_meet_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCohort {
    pub name: Option<String>,
    pub color: Option<String>,
    pub capacity: Option<i32>,
    pub stable_meet_link: Option<String>,
}

/// A row from the `cohort_tutors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CohortTutor {
    pub cohort_id: DbId,
    pub tutor_id: DbId,
    pub created_at: Timestamp,
}

/// A row from the `cohort_students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CohortStudent {
    pub cohort_id: DbId,
    pub student_id: DbId,
    pub enrolled_at: Timestamp,
}

/// An enrolled student joined with profile details.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrolledStudent {
    pub student_id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub status: String,
    pub enrolled_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignTutor {
    pub tutor_id: DbId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollStudent {
    pub student_id: DbId,
}
