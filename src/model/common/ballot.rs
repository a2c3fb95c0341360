//! Which candidates appear on the ballot.

/// The number a candidate runs under. Positive numbers are real parties;
/// [`ABSTAIN`] and [`DISAPPROVE`] are reserved for the pseudo-candidates.
pub type CandidateNumber = i32;

/// The "no vote" option, offered in every election.
pub const ABSTAIN: CandidateNumber = 0;
/// The "disapprove" option, offered only when a single party runs.
pub const DISAPPROVE: CandidateNumber = -1;

/// What a candidate number stands for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CandidateKind {
    Party,
    Abstain,
    Disapprove,
}

impl CandidateKind {
    /// Classify a candidate number. Numbers below [`DISAPPROVE`] mean nothing.
    pub fn of(number: CandidateNumber) -> Option<Self> {
        match number {
            n if n > 0 => Some(Self::Party),
            ABSTAIN => Some(Self::Abstain),
            DISAPPROVE => Some(Self::Disapprove),
            _ => None,
        }
    }
}

/// Anything that runs under a candidate number.
pub trait Numbered {
    fn number(&self) -> CandidateNumber;
}

/// Select the options on the ballot, in ballot order.
///
/// A lone party is a referendum: the party, then "disapprove", then
/// "abstain". Otherwise every party, then "abstain"; "disapprove" is not
/// offered in a contested race.
pub fn ballot_options<T: Numbered>(candidates: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut parties = Vec::new();
    let mut abstain = None;
    let mut disapprove = None;
    for candidate in candidates {
        match CandidateKind::of(candidate.number()) {
            Some(CandidateKind::Party) => parties.push(candidate),
            Some(CandidateKind::Abstain) if abstain.is_none() => abstain = Some(candidate),
            Some(CandidateKind::Disapprove) if disapprove.is_none() => {
                disapprove = Some(candidate)
            }
            _ => {}
        }
    }

    let referendum = parties.len() == 1;
    let mut options = parties;
    if referendum {
        options.extend(disapprove);
    }
    options.extend(abstain);
    options
}
