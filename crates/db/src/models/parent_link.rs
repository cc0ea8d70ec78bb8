//! Parent to student links.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::roles::ROLE_PARENT;
use tutorhub_core::types::{DbId, Timestamp};

use super::profile::Profile;

/// A row from the `parent_student_links` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParentStudentLink {
    pub id: DbId,
    pub parent_id: DbId,
    pub student_id: DbId,
    pub created_at: Timestamp,
}

/// A linked student as shown under a parent.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LinkedStudent {
    pub parent_id: DbId,
    pub student_id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub status: String,
    pub linked_at: Timestamp,
}

/// Request body for linking an existing student to a parent.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkStudent {
    pub student_id: DbId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FamilyMember {
    pub email: String,
    pub full_name: Option<String>,
}

/// Request body for creating a parent, a student, and the link between them.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFamily {
    pub parent: FamilyMember,
    pub student: FamilyMember,
    pub timezone: Option<String>,
    /// Applied to both profiles. Defaults to `customer`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Family {
    pub parent: Profile,
    pub student: Profile,
    pub link: ParentStudentLink,
}

/// A profile with its linked students. Only parents carry the list.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileWithStudents {
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_students: Option<Vec<LinkedStudent>>,
}

impl ProfileWithStudents {
    /// Attach each parent's links, preserving the order of `profiles`.
    pub fn attach(profiles: Vec<Profile>, links: Vec<LinkedStudent>) -> Vec<Self> {
        let mut by_parent: HashMap<DbId, Vec<LinkedStudent>> = HashMap::new();
        for link in links {
            by_parent.entry(link.parent_id).or_default().push(link);
        }
        profiles
            .into_iter()
            .map(|profile| {
                let linked_students = (profile.role == ROLE_PARENT)
                    .then(|| by_parent.remove(&profile.id).unwrap_or_default());
                Self {
                    profile,
                    linked_students,
                }
            })
            .collect()
    }
}
