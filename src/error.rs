use std::fmt::Display;

use argon2::Error as Argon2Error;
use jsonwebtoken::errors::Error as JwtError;
use mongodb::{
    bson::{de::Error as BsonDeError, ser::Error as BsonError},
    error::Error as DbError,
};
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::mongodb::errors::{is_duplicate_key_error, is_write_conflict};

pub type Result<T> = std::result::Result<T, Error>;

/// What a client is told when its write lost a race with another one.
pub const CONCURRENT_MODIFICATION: &str = "Concurrent modification, please retry";

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Bson(#[from] BsonError),
    #[error(transparent)]
    BsonDe(#[from] BsonDeError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl Error {
    pub fn not_found(what: impl Display) -> Self {
        Self::NotFound(what.to_string())
    }

    pub fn conflict(what: impl Display) -> Self {
        Self::Conflict(what.to_string())
    }

    pub fn invalid(what: impl Display) -> Self {
        Self::ValidationFailed(what.to_string())
    }

    /// Convert a failed write, turning unique-index violations and
    /// transaction write conflicts into [`Error::Conflict`] with the given
    /// message.
    pub fn from_write(err: DbError, duplicate: impl Display) -> Self {
        if is_duplicate_key_error(&err) {
            Self::conflict(format!("Duplicate: {duplicate}"))
        } else if is_write_conflict(&err) {
            Self::conflict(CONCURRENT_MODIFICATION)
        } else {
            Self::Db(err)
        }
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Unauthorized(_) | Self::Jwt(_) => Status::Unauthorized,
            Self::NotFound(_) => Status::NotFound,
            Self::Conflict(_) => Status::Conflict,
            Self::ValidationFailed(_) => Status::UnprocessableEntity,
            Self::Db(err) if is_write_conflict(err) => Status::Conflict,
            Self::Db(_) | Self::Bson(_) | Self::BsonDe(_) | Self::Argon2(_) | Self::Io(_) => {
                Status::InternalServerError
            }
        }
    }

    /// The message sent to the client. Driver and other internal details
    /// stay in the log.
    pub fn client_message(&self) -> String {
        match self {
            Self::Db(err) if is_write_conflict(err) => CONCURRENT_MODIFICATION.to_string(),
            _ if self.status().class() == StatusClass::ServerError => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// The body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status.class() == StatusClass::ServerError {
            error!("{self}");
        } else {
            debug!("{self}");
        }
        (status, Json(ErrorBody::new(self.client_message()))).respond_to(req)
    }
}
