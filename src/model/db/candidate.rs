use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::{
    common::ballot::{CandidateNumber, Numbered},
    mongodb::Id,
};

/// Core candidate (party or pseudo-candidate) data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    pub number: CandidateNumber,
    pub name: String,
    #[serde(default)]
    pub slogan: String,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub logo_meaning: String,
    #[serde(default)]
    pub missions: Vec<String>,
    #[serde(default)]
    pub policies: Vec<String>,
    /// Running count of ballots, maintained alongside each vote. Results are
    /// always computed from the voters themselves.
    #[serde(default)]
    pub score: u64,
    /// Bumped by every edit, so that concurrent edits can be detected.
    #[serde(default)]
    pub revision: u32,
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

impl Numbered for Candidate {
    fn number(&self) -> CandidateNumber {
        self.candidate.number
    }
}

impl Numbered for &Candidate {
    fn number(&self) -> CandidateNumber {
        self.candidate.number
    }
}
