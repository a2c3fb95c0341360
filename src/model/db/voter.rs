use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Who a student is, as known to the roster. Refreshed on every import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub faculty_id: Option<String>,
    pub major: String,
    pub year: String,
    pub gender: String,
}

/// Core voter data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCore {
    #[serde(flatten)]
    pub profile: StudentProfile,
    /// Set exactly once, when the ballot is cast.
    pub is_voted: bool,
    /// The chosen candidate; `None` until the ballot is cast.
    pub candidate_id: Option<Id>,
    /// Whether the post-vote survey has been completed.
    pub is_form_completed: bool,
}

impl VoterCore {
    /// A voter who has not voted yet.
    pub fn new(profile: StudentProfile) -> Self {
        Self {
            profile,
            is_voted: false,
            candidate_id: None,
            is_form_completed: false,
        }
    }
}

/// A voter without an ID.
pub type NewVoter = VoterCore;

/// A voter from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

impl DerefMut for Voter {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.voter
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl StudentProfile {
        pub fn example() -> Self {
            Self::example_numbered(1, "Computer Science", "3", "F")
        }

        pub fn example_numbered(n: u32, major: &str, year: &str, gender: &str) -> Self {
            Self {
                student_id: format!("6401{n:04}"),
                name: format!("Student {n}"),
                email: Some(format!("student{n}@example.ac.th")),
                faculty_id: Some("FAC_SCI".to_string()),
                major: major.to_string(),
                year: year.to_string(),
                gender: gender.to_string(),
            }
        }
    }

    impl VoterCore {
        pub fn example() -> Self {
            Self::new(StudentProfile::example())
        }
    }
}
