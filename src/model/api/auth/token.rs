use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use mongodb::Database;
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{FromRequest, Outcome},
    time::Duration,
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    db::{admin::Admin, voter::Voter},
    mongodb::{Coll, Id},
};

use super::user::{Rights, User};

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// A session token representing a specific user with specific rights.
#[derive(Serialize, Deserialize)]
pub struct AuthToken<U> {
    pub id: Id,
    #[serde(rename = "rgt")]
    pub rights: Rights,
    #[serde(skip)]
    phantom: PhantomData<U>,
}

impl<U> AuthToken<U> {
    /// Does this token permit the given rights?
    pub fn permits(&self, target: Rights) -> bool {
        self.rights == target
    }
}

impl<U> AuthToken<U>
where
    U: User,
{
    /// Create a new [`AuthToken`] for the given user, with the correct rights for that user type.
    pub fn new(user: &U) -> Self {
        Self {
            id: user.id(),
            rights: U::RIGHTS,
            phantom: PhantomData,
        }
    }

    /// Sign this token into a session cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Verify a session cookie and recover the token.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims<U>>| claims.claims.token)?;
        Ok(token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<U> {
    #[serde(flatten, bound = "")]
    token: AuthToken<U>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

fn unauthorized<T>(reason: &str) -> Outcome<T, Error> {
    Outcome::Failure((Status::Unauthorized, Error::Unauthorized(reason.to_string())))
}

#[rocket::async_trait]
impl<'r, U> FromRequest<'r> for AuthToken<U>
where
    U: User + Send,
{
    type Error = Error;

    /// Get an [`AuthToken`] from the session cookie, check it has the rights
    /// for this user type, and check the user still exists.
    ///
    /// Any failure is `401 Unauthorized`; routes that serve anonymous callers
    /// too take an `Option<AuthToken<U>>`.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match req.guard::<&State<Config>>().await {
            Outcome::Success(config) => config,
            _ => {
                let err = Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "application config is not managed",
                ));
                return Outcome::Failure((Status::InternalServerError, err));
            }
        };

        let cookie = match req.cookies().get(AUTH_TOKEN_COOKIE) {
            Some(cookie) => cookie,
            None => return unauthorized("Not signed in"),
        };

        let token: Self = match Self::from_cookie(cookie, config) {
            Ok(token) => token,
            Err(_) => return unauthorized("Session is invalid or has expired"),
        };

        if !token.permits(U::RIGHTS) {
            return unauthorized(&format!("This action requires {} rights", U::RIGHTS));
        }

        // Check the user actually exists; they may have been removed since sign-in.
        let db = match req.guard::<&State<Database>>().await {
            Outcome::Success(db) => db,
            _ => return unauthorized("Session cannot be checked"),
        };
        let found = match token.rights {
            Rights::Voter => Coll::<Voter>::from_db(db)
                .find_one(token.id.as_doc(), None)
                .await
                .map(|voter| voter.is_some()),
            Rights::Admin => Coll::<Admin>::from_db(db)
                .find_one(token.id.as_doc(), None)
                .await
                .map(|admin| admin.is_some()),
        };
        match found {
            Ok(true) => Outcome::Success(token),
            Ok(false) => unauthorized("Account no longer exists"),
            Err(e) => Outcome::Failure((Status::InternalServerError, e.into())),
        }
    }
}
