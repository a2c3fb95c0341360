use std::collections::{HashMap, HashSet};

use rocket::{fs::TempFile, serde::json::Json};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::ballot::{CandidateKind, CandidateNumber, Numbered},
    db::{
        candidate::{Candidate, NewCandidate},
        member::{Member, NewMember},
    },
    mongodb::Id,
};

use super::id::ApiId;

/// The multipart form used to create or update a candidate.
#[derive(FromForm)]
pub struct CandidateForm<'r> {
    pub name: String,
    pub number: CandidateNumber,
    #[field(default = String::new())]
    pub slogan: String,
    #[field(name = "logoMeaning", default = String::new())]
    pub logo_meaning: String,
    pub missions: Option<Json<Vec<String>>>,
    pub policies: Option<Json<Vec<String>>>,
    /// New logo image.
    pub file: Option<TempFile<'r>>,
    pub members: Option<Json<Vec<MemberSpec>>>,
    /// New member photos, keyed by student ID.
    #[field(name = "memberFiles", default = HashMap::new())]
    pub member_files: HashMap<String, TempFile<'r>>,
    /// The revision the editor last saw, if they want a conditional update.
    pub revision: Option<u32>,
}

impl<'r> CandidateForm<'r> {
    /// The submitted members, or none.
    pub fn member_specs(&self) -> &[MemberSpec] {
        self.members.as_ref().map_or(&[][..], |members| members.as_slice())
    }

    /// Check the form before anything is written.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid("Party name is required"));
        }
        if CandidateKind::of(self.number).is_none() {
            return Err(Error::invalid(format!(
                "Invalid party number {}",
                self.number
            )));
        }
        validate_members(self.member_specs())
    }

    /// The candidate document described by this form. Score and revision
    /// are owned by the database and start at zero.
    pub fn to_candidate(&self, logo_url: Option<String>) -> NewCandidate {
        NewCandidate {
            number: self.number,
            name: self.name.trim().to_string(),
            slogan: self.slogan.clone(),
            logo_url,
            logo_meaning: self.logo_meaning.clone(),
            missions: json_list(&self.missions),
            policies: json_list(&self.policies),
            score: 0,
            revision: 0,
        }
    }
}

fn json_list(list: &Option<Json<Vec<String>>>) -> Vec<String> {
    list.as_ref()
        .map(|items| {
            items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A party member as submitted by the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSpec {
    pub name: String,
    pub student_id: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub existing_image_url: Option<String>,
}

impl MemberSpec {
    /// The member document for this spec, given its final image URL.
    pub fn to_member(&self, candidate_id: Id, image_url: String) -> NewMember {
        NewMember {
            candidate_id,
            name: self.name.trim().to_string(),
            student_id: self.student_id.trim().to_string(),
            position: self.position.trim().to_string(),
            image_url,
        }
    }
}

/// Names and student IDs must be present, and no student may appear twice.
pub fn validate_members(members: &[MemberSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for member in members {
        let student_id = member.student_id.trim();
        if member.name.trim().is_empty() {
            return Err(Error::invalid("Every member needs a name"));
        }
        if student_id.is_empty() {
            return Err(Error::invalid(format!(
                "Member {} has no student ID",
                member.name.trim()
            )));
        }
        if !seen.insert(student_id) {
            return Err(Error::invalid(format!(
                "Student {student_id} is listed more than once"
            )));
        }
    }
    Ok(())
}

/// A member as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDesc {
    pub id: ApiId,
    pub name: String,
    pub student_id: String,
    pub position: String,
    pub image_url: String,
}

impl From<Member> for MemberDesc {
    fn from(member: Member) -> Self {
        Self {
            id: member.id.into(),
            name: member.member.name,
            student_id: member.member.student_id,
            position: member.member.position,
            image_url: member.member.image_url,
        }
    }
}

/// A candidate with its members, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDesc {
    pub id: ApiId,
    pub number: CandidateNumber,
    pub name: String,
    pub slogan: String,
    pub logo_url: Option<String>,
    pub logo_meaning: String,
    pub missions: Vec<String>,
    pub policies: Vec<String>,
    pub score: u64,
    pub revision: u32,
    pub members: Vec<MemberDesc>,
}

impl CandidateDesc {
    /// Pair a candidate with its members, which are kept in stored order.
    pub fn new(candidate: Candidate, members: Vec<Member>) -> Self {
        let core = candidate.candidate;
        Self {
            id: candidate.id.into(),
            number: core.number,
            name: core.name,
            slogan: core.slogan,
            logo_url: core.logo_url,
            logo_meaning: core.logo_meaning,
            missions: core.missions,
            policies: core.policies,
            score: core.score,
            revision: core.revision,
            members: members.into_iter().map(MemberDesc::from).collect(),
        }
    }

    /// Group members under their candidates.
    pub fn with_members(candidates: Vec<Candidate>, members: Vec<Member>) -> Vec<Self> {
        let mut by_candidate: HashMap<Id, Vec<Member>> = HashMap::new();
        for member in members {
            by_candidate
                .entry(member.candidate_id)
                .or_default()
                .push(member);
        }
        candidates
            .into_iter()
            .map(|candidate| {
                let members = by_candidate.remove(&candidate.id).unwrap_or_default();
                Self::new(candidate, members)
            })
            .collect()
    }
}

impl Numbered for CandidateDesc {
    fn number(&self) -> CandidateNumber {
        self.number
    }
}

/// The parent party of a member in the flat member listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub number: CandidateNumber,
    pub name: String,
    pub logo_url: Option<String>,
}

/// A member alongside a summary of their party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListing {
    #[serde(flatten)]
    pub member: MemberDesc,
    pub candidate: CandidateSummary,
}

impl MemberListing {
    /// Flatten every party's members into one list, ordered by party number
    /// and then by the order the members were stored.
    pub fn from_candidates(mut candidates: Vec<CandidateDesc>) -> Vec<Self> {
        candidates.sort_by_key(|candidate| candidate.number);
        candidates
            .into_iter()
            .flat_map(|candidate| {
                let summary = CandidateSummary {
                    number: candidate.number,
                    name: candidate.name,
                    logo_url: candidate.logo_url,
                };
                candidate.members.into_iter().map(move |member| Self {
                    member,
                    candidate: summary.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl MemberSpec {
        pub fn example(n: u32, position: &str) -> Self {
            Self {
                name: format!("Member {n}"),
                student_id: format!("6502{n:04}"),
                position: position.to_string(),
                existing_image_url: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::db::{candidate::CandidateCore, member::MemberCore};

    use super::*;

    #[test]
    fn member_validation() {
        let members = vec![MemberSpec::example(1, "เลขานุการ"), MemberSpec::example(2, "")];
        assert!(validate_members(&members).is_ok());
        assert!(validate_members(&[]).is_ok());

        let mut unnamed = MemberSpec::example(3, "");
        unnamed.name = " ".to_string();
        assert!(matches!(
            validate_members(&[unnamed]),
            Err(Error::ValidationFailed(_))
        ));

        let mut no_id = MemberSpec::example(3, "");
        no_id.student_id = String::new();
        assert!(validate_members(&[no_id]).is_err());

        let mut twin = MemberSpec::example(4, "");
        twin.student_id = format!(" {} ", members[0].student_id);
        assert!(validate_members(&[members[0].clone(), twin]).is_err());
    }

    #[test]
    fn member_spec_parses_camel_case() {
        let json = r#"[{"name":"A","studentId":"1","position":"x","existingImageUrl":"/images/a.jpg"},
                       {"name":"B","studentId":"2"}]"#;
        let specs: Vec<MemberSpec> = rocket::serde::json::serde_json::from_str(json).unwrap();
        assert_eq!(specs[0].existing_image_url.as_deref(), Some("/images/a.jpg"));
        assert_eq!(specs[1].position, "");
        assert_eq!(specs[1].existing_image_url, None);
    }

    #[test]
    fn members_are_grouped_and_flattened() {
        let first = Candidate {
            id: Id::new(),
            candidate: CandidateCore::example(2),
        };
        let second = Candidate {
            id: Id::new(),
            candidate: CandidateCore::example(1),
        };
        let member = |candidate: &Candidate, n: u32| Member {
            id: Id::new(),
            member: MemberCore {
                candidate_id: candidate.id,
                name: format!("Member {n}"),
                student_id: n.to_string(),
                position: String::new(),
                image_url: String::new(),
            },
        };
        let members = vec![
            member(&first, 1),
            member(&second, 2),
            member(&first, 3),
        ];

        let descs = CandidateDesc::with_members(vec![first, second], members);
        assert_eq!(descs[0].members.len(), 2);
        assert_eq!(descs[0].members[1].student_id, "3");
        assert_eq!(descs[1].members.len(), 1);

        let listing = MemberListing::from_candidates(descs);
        let order: Vec<_> = listing
            .iter()
            .map(|entry| (entry.candidate.number, entry.member.student_id.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "2"), (2, "1"), (2, "3")]);
    }
}
