use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            admin::AdminCredentials,
            auth::{AuthToken, VoterLogin, AUTH_TOKEN_COOKIE},
            voter::VoterStatus,
        },
        db::{admin::Admin, voter::Voter},
        mongodb::Coll,
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![authenticate_admin, authenticate_voter, logout]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub async fn authenticate_admin(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    admins: Coll<Admin>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username
    };

    let admin = admins
        .find_one(with_username, None)
        .await?
        .filter(|admin| admin.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Unauthorized(
                "No admin found with the provided username and password combination".to_string(),
            )
        })?;

    let token = AuthToken::new(&admin);
    cookies.add(token.into_cookie(config)?);
    info!("Admin {} signed in", admin.username);

    Ok(())
}

/// Sign a voter in. Only students on the roster may vote.
#[post("/auth/voter", data = "<login>", format = "json")]
pub async fn authenticate_voter(
    cookies: &CookieJar<'_>,
    login: Json<VoterLogin>,
    voters: Coll<Voter>,
    config: &State<Config>,
) -> Result<Json<VoterStatus>> {
    let student_id = login.student_id.trim();
    let with_student_id = doc! {
        "student_id": student_id,
    };

    let voter = voters
        .find_one(with_student_id, None)
        .await?
        .ok_or_else(|| {
            Error::Unauthorized(format!("Student {student_id} is not on the voter roster"))
        })?;

    let token = AuthToken::new(&voter);
    cookies.add(token.into_cookie(config)?);

    Ok(Json(voter.into()))
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
