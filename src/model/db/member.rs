use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core party member data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCore {
    /// The party this member stands with.
    pub candidate_id: Id,
    pub name: String,
    pub student_id: String,
    pub position: String,
    #[serde(default)]
    pub image_url: String,
}

/// A member without an ID.
pub type NewMember = MemberCore;

/// A member from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub member: MemberCore,
}

impl Deref for Member {
    type Target = MemberCore;

    fn deref(&self) -> &Self::Target {
        &self.member
    }
}

impl DerefMut for Member {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.member
    }
}
