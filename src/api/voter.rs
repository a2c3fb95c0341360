use mongodb::{bson::doc, Client};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    logging::RequestId,
    model::{
        api::{auth::AuthToken, ballot::BallotRequest, voter::VoterStatus},
        common::ballot::ballot_options,
        db::{candidate::Candidate, voter::Voter},
        mongodb::{Coll, Id},
    },
    Config,
};

use super::common::get_voter_from_token;

pub fn routes() -> Vec<Route> {
    routes![voter_status, cast_vote, complete_form]
}

#[get("/voter/status")]
async fn voter_status(token: AuthToken<Voter>, voters: Coll<Voter>) -> Result<Json<VoterStatus>> {
    let voter = get_voter_from_token(&token, &voters).await?;
    Ok(Json(voter.into()))
}

/// Cast the signed-in voter's single ballot.
#[post("/vote", data = "<ballot>", format = "json")]
async fn cast_vote(
    token: AuthToken<Voter>,
    ballot: Json<BallotRequest>,
    request_id: &RequestId,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    config: &State<Config>,
    db_client: &State<Client>,
) -> Result<Json<VoterStatus>> {
    let phase = config.election().current_phase();
    if !phase.accepts_ballots() {
        return Err(Error::conflict(format!(
            "Voting is not open (election is {phase:?})"
        )));
    }

    let voter = get_voter_from_token(&token, &voters).await?;
    if !ballot.is_for(&voter.profile.student_id) {
        return Err(Error::Unauthorized(
            "Ballot student ID does not match the signed-in voter".to_string(),
        ));
    }
    if voter.is_voted {
        return Err(Error::conflict("Already voted"));
    }

    // The choice must be one the ballot actually offers.
    let candidate_id: Id = ballot.candidate_id.into();
    let all_candidates = candidates
        .find(None, None)
        .await?
        .try_collect::<Vec<_>>()
        .await?;
    if !all_candidates.iter().any(|c| c.id == candidate_id) {
        return Err(Error::not_found(format!("Candidate {candidate_id}")));
    }
    if !ballot_options(&all_candidates)
        .iter()
        .any(|c| c.id == candidate_id)
    {
        return Err(Error::invalid(format!(
            "Candidate {candidate_id} is not on the ballot"
        )));
    }

    record_ballot(voter.id, candidate_id, &voters, &candidates, db_client).await?;
    info!("{request_id}: ballot recorded for {}", voter.profile.student_id);

    let voter = get_voter_from_token(&token, &voters).await?;
    Ok(Json(voter.into()))
}

/// Mark the voter as having voted and count the ballot, in one transaction.
/// Nothing is written unless the voter has not voted yet and the candidate
/// still exists when the transaction runs.
async fn record_ballot(
    voter_id: Id,
    candidate_id: Id,
    voters: &Coll<Voter>,
    candidates: &Coll<Candidate>,
    db_client: &Client,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let not_yet_voted = doc! {
        "_id": voter_id,
        "is_voted": false,
    };
    let mark_voted = doc! {
        "$set": {
            "is_voted": true,
            "candidate_id": candidate_id,
        }
    };
    let result = voters
        .update_one_with_session(not_yet_voted, mark_voted, None, &mut session)
        .await
        .map_err(|e| Error::from_write(e, "ballot"))?;
    if result.matched_count != 1 {
        // Dropping the session aborts the transaction.
        return Err(Error::conflict("Already voted"));
    }

    let increment = doc! {
        "$inc": { "score": 1 }
    };
    let result = candidates
        .update_one_with_session(candidate_id.as_doc(), increment, None, &mut session)
        .await
        .map_err(|e| Error::from_write(e, "ballot"))?;
    if result.matched_count != 1 {
        // Deleted since the ballot was checked; the voter stays unvoted.
        return Err(Error::not_found(format!("Candidate {candidate_id}")));
    }

    session
        .commit_transaction()
        .await
        .map_err(|e| Error::from_write(e, "ballot"))
}

/// Mark the post-vote survey as done.
#[post("/voter/complete-form")]
async fn complete_form(token: AuthToken<Voter>, voters: Coll<Voter>) -> Result<Json<VoterStatus>> {
    let update = doc! {
        "$set": { "is_form_completed": true }
    };
    let result = voters.update_one(token.id.as_doc(), update, None).await?;
    if result.matched_count != 1 {
        return Err(Error::Unauthorized(format!(
            "No voter found with ID {}",
            token.id
        )));
    }

    let voter = get_voter_from_token(&token, &voters).await?;
    Ok(Json(voter.into()))
}
