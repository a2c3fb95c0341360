use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::db::admin::NewAdmin;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw admin credentials, received from a user. These are never stored directly,
/// since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl TryFrom<AdminCredentials> for NewAdmin {
    type Error = Error;

    /// Convert [`AdminCredentials`] to a new admin by hashing the password.
    /// This enforces that the username is non-empty, and the password meets minimum length.
    fn try_from(cred: AdminCredentials) -> Result<Self, Self::Error> {
        if cred.username.trim().is_empty() {
            return Err(Error::invalid("Admin username must not be empty"));
        }
        if cred.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::invalid(format!(
                "Admin password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        // 16 bytes of salt is the recommendation for Argon2.
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(cred.password.as_bytes(), &salt, &argon2::Config::default())?;
        Ok(Self {
            username: cred.username,
            password_hash,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_weak_credentials() {
        assert!(NewAdmin::try_from(AdminCredentials::empty()).is_err());
        let short = AdminCredentials {
            username: "someone".into(),
            password: "short".into(),
        };
        assert!(matches!(
            NewAdmin::try_from(short),
            Err(Error::ValidationFailed(_))
        ));
    }

    #[test]
    fn hashes_the_password() {
        let admin = NewAdmin::try_from(AdminCredentials::example()).unwrap();
        assert_eq!(admin.username, "council-admin");
        assert_ne!(admin.password_hash, AdminCredentials::example().password);
        assert!(admin.password_hash.starts_with("$argon2"));
    }
}
