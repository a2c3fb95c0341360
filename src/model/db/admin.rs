use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{api::admin::AdminCredentials, mongodb::Coll, mongodb::Id};

/// Core admin user data.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCore {
    pub username: String,
    pub password_hash: String,
}

impl AdminCore {
    /// Check whether the given password is correct. A malformed stored hash
    /// never verifies.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}

/// An admin without an ID.
pub type NewAdmin = AdminCore;

/// An admin user from the database, with its unique ID.
#[derive(Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub admin: AdminCore,
}

impl Deref for Admin {
    type Target = AdminCore;

    fn deref(&self) -> &Self::Target {
        &self.admin
    }
}

impl DerefMut for Admin {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.admin
    }
}

/// Make sure someone can log in to the admin console: if there are no admins
/// yet, create one from the seed credentials.
pub async fn ensure_admin_exists(
    admins: &Coll<Admin>,
    new_admins: &Coll<NewAdmin>,
    seed: Option<AdminCredentials>,
) -> Result<()> {
    if admins.count_documents(None, None).await? > 0 {
        return Ok(());
    }

    match seed {
        Some(credentials) => {
            let admin = NewAdmin::try_from(credentials)?;
            info!("No admins found, creating initial admin {}", admin.username);
            new_admins.insert_one(admin, None).await?;
        }
        None => warn!("No admins exist and no seed admin is configured"),
    }
    Ok(())
}
