use mongodb::{bson::doc, options::SessionOptions, Client};
use rocket::{serde::json::Json, Route, State};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    model::{
        api::{
            auth::AuthToken,
            candidate::CandidateDesc,
            results::{gallery_urls, results_board, Audience, ElectionResults, Turnout, VoterStats},
        },
        common::{ballot::CandidateNumber, election::ElectionPhase},
        db::{admin::Admin, candidate::Candidate, member::Member, voter::Voter},
        mongodb::Coll,
    },
    Config,
};

use super::common::{candidates_with_members, demographic, tally_votes};

pub fn routes() -> Vec<Route> {
    routes![results, parties, turnout, gallery]
}

/// The results board. Signed-in admins see live scores whatever the phase.
#[get("/results")]
async fn results(
    admin: Option<AuthToken<Admin>>,
    candidates: Coll<Candidate>,
    members: Coll<Member>,
    voters: Coll<Voter>,
    config: &State<Config>,
    db_client: &State<Client>,
) -> Result<Json<ElectionResults>> {
    let phase = config.election().current_phase();
    let audience = if admin.is_some() {
        Audience::Admin
    } else {
        Audience::Public
    };

    // Read every figure from one snapshot so the totals agree.
    let session_options = SessionOptions::builder().snapshot(true).build();
    let mut session = db_client.start_session(Some(session_options)).await?;

    let all_candidates = candidates_with_members(None, &candidates, &members, &mut session).await?;
    let tallies = tally_votes(&voters, &mut session).await?;
    let total_votes = voters
        .count_documents_with_session(doc! { "is_voted": true }, None, &mut session)
        .await?;
    let stats = VoterStats {
        total_eligible: voters
            .count_documents_with_session(None, None, &mut session)
            .await?,
        by_major: demographic("major", &voters, &mut session).await?,
        by_year: demographic("year", &voters, &mut session).await?,
        by_gender: demographic("gender", &voters, &mut session).await?,
    };

    Ok(Json(ElectionResults {
        status: phase,
        total_votes,
        campaign_date: config.election().campaign_start,
        candidates: results_board(all_candidates, &tallies, total_votes, phase, audience),
        stats,
    }))
}

/// The competing parties and their members, once the campaign has opened.
#[get("/parties")]
async fn parties(
    candidates: Coll<Candidate>,
    members: Coll<Member>,
    config: &State<Config>,
    db_client: &State<Client>,
) -> Result<Json<Vec<CandidateDesc>>> {
    let phase = config.election().current_phase();
    if !phase.parties_public() {
        return Ok(Json(Vec::new()));
    }

    let mut session = db_client.start_session(None).await?;
    let real_parties = doc! { "number": { "$gt": 0 } };
    let mut parties =
        candidates_with_members(real_parties, &candidates, &members, &mut session).await?;

    // Running scores are only published with the results.
    if phase != ElectionPhase::Ended {
        for party in &mut parties {
            party.score = 0;
        }
    }
    Ok(Json(parties))
}

#[get("/turnout")]
async fn turnout(voters: Coll<Voter>) -> Result<Json<Turnout>> {
    let total_eligible = voters.count_documents(None, None).await?;
    let total_voted = voters
        .count_documents(doc! { "is_voted": true }, None)
        .await?;
    Ok(Json(Turnout::new(total_eligible, total_voted)))
}

/// A party's group photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gallery {
    pub images: Vec<String>,
}

#[get("/gallery?<id>")]
fn gallery(id: Option<CandidateNumber>) -> Json<Gallery> {
    Json(Gallery {
        images: id.map(gallery_urls).unwrap_or_default(),
    })
}
