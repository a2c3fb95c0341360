use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::db::voter::{StudentProfile, Voter};

/// A roster entry as exported by the registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub faculty_id: Option<String>,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub gender: String,
}

impl TryFrom<StudentRecord> for StudentProfile {
    type Error = Error;

    fn try_from(record: StudentRecord) -> Result<Self> {
        let student_id = record.student_id.trim().to_string();
        if student_id.is_empty() {
            return Err(Error::invalid("Roster entry is missing a student ID"));
        }
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::invalid(format!("Student {student_id} has no name")));
        }
        Ok(Self {
            student_id,
            name,
            email: record.email.filter(|email| !email.trim().is_empty()),
            faculty_id: record.faculty_id.filter(|id| !id.trim().is_empty()),
            major: record.major.trim().to_string(),
            year: record.year.trim().to_string(),
            gender: record.gender.trim().to_string(),
        })
    }
}

/// Outcome of a roster import.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterImportSummary {
    pub created: u64,
    pub updated: u64,
}

/// What a signed-in voter sees about themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterStatus {
    pub student_id: String,
    pub name: String,
    pub is_voted: bool,
    pub is_form_completed: bool,
}

impl From<Voter> for VoterStatus {
    fn from(voter: Voter) -> Self {
        Self {
            student_id: voter.voter.profile.student_id,
            name: voter.voter.profile.name,
            is_voted: voter.voter.is_voted,
            is_form_completed: voter.voter.is_form_completed,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_trimmed_into_profile() {
        let record = StudentRecord {
            student_id: " 64010001 ".to_string(),
            name: "  Student 1".to_string(),
            email: Some("".to_string()),
            faculty_id: None,
            major: "Physics ".to_string(),
            year: "2".to_string(),
            gender: "M".to_string(),
        };
        let profile = StudentProfile::try_from(record).unwrap();
        assert_eq!(profile.student_id, "64010001");
        assert_eq!(profile.name, "Student 1");
        assert_eq!(profile.email, None);
        assert_eq!(profile.major, "Physics");
    }

    #[test]
    fn record_needs_id_and_name() {
        let mut record = StudentRecord::example_numbered(1, "Physics", "2", "M");
        record.student_id = "   ".to_string();
        assert!(matches!(
            StudentProfile::try_from(record),
            Err(Error::ValidationFailed(_))
        ));

        let mut record = StudentRecord::example_numbered(1, "Physics", "2", "M");
        record.name = String::new();
        assert!(StudentProfile::try_from(record).is_err());
    }

    #[test]
    fn record_accepts_minimal_json() {
        let record: StudentRecord =
            rocket::serde::json::serde_json::from_str(r#"{"studentId":"6401","name":"A"}"#)
                .unwrap();
        assert_eq!(record.major, "");
        assert_eq!(record.email, None);
    }
}
