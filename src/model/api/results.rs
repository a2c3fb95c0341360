use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{
        ballot::{ballot_options, CandidateNumber, Numbered},
        election::ElectionPhase,
    },
    mongodb::Id,
};

use super::candidate::CandidateDesc;

/// Who is looking at the results.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Audience {
    Public,
    Admin,
}

/// A candidate on the results board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    #[serde(flatten)]
    pub candidate: CandidateDesc,
    /// Share of the votes cast, in percent.
    pub percentage: f64,
}

impl Numbered for CandidateResult {
    fn number(&self) -> CandidateNumber {
        self.candidate.number
    }
}

/// One bar of a demographic breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicCount {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterStats {
    pub total_eligible: u64,
    pub by_major: Vec<DemographicCount>,
    pub by_year: Vec<DemographicCount>,
    pub by_gender: Vec<DemographicCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResults {
    pub status: ElectionPhase,
    pub total_votes: u64,
    pub campaign_date: DateTime<Utc>,
    pub candidates: Vec<CandidateResult>,
    pub stats: VoterStats,
}

/// `part` as a percentage of `whole`, to two decimal places.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 10_000.0 / whole as f64).round() / 100.0
}

/// Build the results board from every stored candidate.
///
/// Scores are replaced by the tallies counted from voter records; a
/// candidate nobody chose scores zero. The board keeps only the options a
/// ballot would offer, then hides or orders them according to the phase and
/// who is asking.
pub fn results_board(
    candidates: Vec<CandidateDesc>,
    tallies: &HashMap<Id, u64>,
    total_votes: u64,
    phase: ElectionPhase,
    audience: Audience,
) -> Vec<CandidateResult> {
    let board = candidates.into_iter().map(|mut candidate| {
        candidate.score = tallies.get(&*candidate.id).copied().unwrap_or(0);
        CandidateResult {
            percentage: percentage(candidate.score, total_votes),
            candidate,
        }
    });
    let mut board = ballot_options(board);

    match (audience, phase) {
        (Audience::Admin, _) => board.sort_by_key(|result| result.candidate.number),
        (Audience::Public, ElectionPhase::PreCampaign) => board.clear(),
        (Audience::Public, ElectionPhase::Waiting | ElectionPhase::Ongoing) => {
            board.sort_by_key(|result| result.candidate.number);
            for result in &mut board {
                result.candidate.score = 0;
                result.percentage = 0.0;
            }
        }
        (Audience::Public, ElectionPhase::Ended) => {
            // Stable, so ties keep ballot order.
            board.sort_by(|a, b| b.candidate.score.cmp(&a.candidate.score));
        }
    }
    board
}

/// How many of the eligible voters have voted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turnout {
    pub total_eligible: u64,
    pub total_voted: u64,
    pub percentage: f64,
}

impl Turnout {
    pub fn new(total_eligible: u64, total_voted: u64) -> Self {
        Self {
            total_eligible,
            total_voted,
            percentage: percentage(total_voted, total_eligible),
        }
    }
}

/// Number of group photos each party may publish.
pub const GALLERY_SIZE: usize = 5;

/// The public URLs of a party's group photos.
pub fn gallery_urls(party: CandidateNumber) -> Vec<String> {
    (1..=GALLERY_SIZE)
        .map(|i| format!("/images/candidates/groupimage/party{party}/{i}.jpg"))
        .collect()
}
