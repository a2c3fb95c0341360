use std::collections::HashMap;

use mongodb::{
    bson::{doc, from_document, Document},
    options::FindOptions,
    ClientSession,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::{Error, Result};
use crate::model::{
    api::{auth::AuthToken, candidate::CandidateDesc, results::DemographicCount},
    db::{candidate::Candidate, member::Member, voter::Voter},
    mongodb::{Coll, Id},
};

/// Return a Voter from the database via looking up their token ID.
pub async fn get_voter_from_token(token: &AuthToken<Voter>, voters: &Coll<Voter>) -> Result<Voter> {
    voters
        .find_one(token.id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::Unauthorized(format!("No voter found with ID {}", token.id)))
}

/// Candidates matching `filter`, ordered by number, each with its members in
/// stored order.
pub async fn candidates_with_members(
    filter: impl Into<Option<Document>>,
    candidates: &Coll<Candidate>,
    members: &Coll<Member>,
    session: &mut ClientSession,
) -> Result<Vec<CandidateDesc>> {
    let by_number = FindOptions::builder().sort(doc! { "number": 1 }).build();
    let mut cursor = candidates
        .find_with_session(filter, by_number, session)
        .await?;
    let mut found = Vec::new();
    while let Some(candidate) = cursor.next(session).await {
        found.push(candidate?);
    }

    let ids: Vec<Id> = found.iter().map(|candidate| candidate.id).collect();
    let of_candidates = doc! { "candidate_id": { "$in": ids } };
    let in_order = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let mut cursor = members
        .find_with_session(of_candidates, in_order, session)
        .await?;
    let mut found_members = Vec::new();
    while let Some(member) = cursor.next(session).await {
        found_members.push(member?);
    }

    Ok(CandidateDesc::with_members(found, found_members))
}

/// One group from a `$group` stage that counts documents.
#[derive(Deserialize)]
struct GroupCount<K> {
    #[serde(rename = "_id")]
    key: K,
    value: i64,
}

/// Count voters who have voted, grouped by `field`, ordered by key.
async fn count_votes_by<K>(
    field: &str,
    voters: &Coll<Voter>,
    session: &mut ClientSession,
) -> Result<Vec<(K, u64)>>
where
    K: DeserializeOwned,
{
    let pipeline = [
        doc! { "$match": { "is_voted": true } },
        doc! { "$group": { "_id": format!("${field}"), "value": { "$sum": 1 } } },
        doc! { "$sort": { "_id": 1 } },
    ];
    let mut cursor = voters
        .aggregate_with_session(pipeline, None, session)
        .await?;
    let mut groups = Vec::new();
    while let Some(group) = cursor.next(session).await {
        let group: GroupCount<K> = from_document(group?)?;
        groups.push((group.key, group.value.max(0) as u64));
    }
    Ok(groups)
}

/// Votes per candidate, counted from the voter records.
pub async fn tally_votes(
    voters: &Coll<Voter>,
    session: &mut ClientSession,
) -> Result<HashMap<Id, u64>> {
    let groups = count_votes_by::<Option<Id>>("candidate_id", voters, session).await?;
    Ok(groups
        .into_iter()
        .filter_map(|(candidate, votes)| Some((candidate?, votes)))
        .collect())
}

/// Votes cast, broken down by a demographic attribute. Voters with no value
/// recorded are grouped under the empty name.
pub async fn demographic(
    field: &str,
    voters: &Coll<Voter>,
    session: &mut ClientSession,
) -> Result<Vec<DemographicCount>> {
    let groups = count_votes_by::<Option<String>>(field, voters, session).await?;
    Ok(groups
        .into_iter()
        .map(|(name, value)| DemographicCount {
            name: name.unwrap_or_default(),
            value,
        })
        .collect())
}
