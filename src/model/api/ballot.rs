use serde::{Deserialize, Serialize};

use super::id::ApiId;

/// A ballot submitted by a signed-in voter.
///
/// `student_id` is optional; when given it must name the signed-in voter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    pub candidate_id: ApiId,
}

impl BallotRequest {
    /// Does the optional student ID agree with the given one?
    pub fn is_for(&self, student_id: &str) -> bool {
        self.student_id
            .as_deref()
            .map_or(true, |claimed| claimed.trim() == student_id)
    }
}
