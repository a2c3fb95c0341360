use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the election stands relative to the configured schedule.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElectionPhase {
    /// Before the campaign opens; parties are not yet public.
    PreCampaign,
    /// Campaigning; parties are public but voting has not opened.
    Waiting,
    /// Voting is open.
    Ongoing,
    /// Voting has closed; results are public.
    Ended,
}

impl ElectionPhase {
    /// Are ballots accepted in this phase?
    pub fn accepts_ballots(self) -> bool {
        self == Self::Ongoing
    }

    /// Are the parties visible to the public in this phase?
    pub fn parties_public(self) -> bool {
        self != Self::PreCampaign
    }
}

/// The three instants that define the election, loaded once from config.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSchedule {
    pub campaign_start: DateTime<Utc>,
    pub election_start: DateTime<Utc>,
    pub election_end: DateTime<Utc>,
}

impl ElectionSchedule {
    /// The phase at the given instant. Each boundary belongs to the phase it opens.
    pub fn phase_at(&self, now: DateTime<Utc>) -> ElectionPhase {
        if now >= self.election_end {
            ElectionPhase::Ended
        } else if now >= self.election_start {
            ElectionPhase::Ongoing
        } else if now >= self.campaign_start {
            ElectionPhase::Waiting
        } else {
            ElectionPhase::PreCampaign
        }
    }

    /// The phase right now.
    pub fn current_phase(&self) -> ElectionPhase {
        self.phase_at(Utc::now())
    }

    /// Whether `campaign_start < election_start < election_end`.
    pub fn is_ordered(&self) -> bool {
        self.campaign_start < self.election_start && self.election_start < self.election_end
    }
}
