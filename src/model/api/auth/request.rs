use serde::{Deserialize, Serialize};

/// A voter sign-in request. Eligibility comes from the roster, so the
/// student ID is all that is asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterLogin {
    pub student_id: String,
}
