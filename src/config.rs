use std::path::PathBuf;

use chrono::Duration;
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    fs::FileServer,
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    api::admin::AdminCredentials,
    common::election::ElectionSchedule,
    db::admin::ensure_admin_exists,
    mongodb::{ensure_indexes_exist, Coll},
};
use crate::storage::ImageStore;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    image_root: PathBuf,
    election: ElectionSchedule,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Directory under which uploaded images are written. Public image URLs
    /// are paths relative to this directory.
    pub fn image_root(&self) -> &PathBuf {
        &self.image_root
    }

    /// The configured campaign and voting window.
    pub fn election(&self) -> &ElectionSchedule {
        &self.election
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state,
/// along with the image store and a file server for the stored images.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        if !config.election.is_ordered() {
            warn!(
                "Election boundaries are out of order: campaign {}, start {}, end {}",
                config.election.campaign_start,
                config.election.election_start,
                config.election.election_end,
            );
        }

        // Prepare the image directories; the file server needs them to exist.
        let images = ImageStore::new(config.image_root.clone());
        if let Err(e) = images.prepare().await {
            error!(
                "Failed to create image directory under {}: {e}",
                config.image_root.display()
            );
            return Err(rocket);
        }
        info!("Serving images from {}", images.public_dir().display());

        // Manage the state.
        rocket = rocket
            .mount("/images", FileServer::from(images.public_dir()))
            .manage(images)
            .manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    db_name: Option<String>,
    admin_username: Option<String>,
    // secrets
    db_uri: String,
    admin_password: Option<String>,
}

impl DbConfig {
    /// Credentials for the initial admin, if both halves are configured.
    fn seed_admin(&self) -> Option<AdminCredentials> {
        Some(AdminCredentials {
            username: self.admin_username.clone()?,
            password: self.admin_password.clone()?,
        })
    }
}

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places both a `Client` and a `Database`
/// into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(&config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&get_database_name(config.db_name.clone()));

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to create database indexes: {e}");
            return Err(rocket);
        }

        // Ensure there is an admin to log in as.
        if let Err(e) =
            ensure_admin_exists(&Coll::from_db(&db), &Coll::from_db(&db), config.seed_admin()).await
        {
            error!("Failed to create the initial admin: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
pub(crate) fn get_database_name(configured: Option<String>) -> String {
    configured.unwrap_or_else(|| "council_vote".to_string())
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn get_database_name(_configured: Option<String>) -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}
