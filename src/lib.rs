#[macro_use]
extern crate log;

#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;

pub use config::Config;

use config::{ConfigFairing, DatabaseFairing};
use logging::LoggerFairing;

/// Build the server, ready for ignition. Configuration and the database
/// connection are loaded by fairings during ignition.
pub fn build() -> Rocket<Build> {
    mount_api(rocket::build().attach(DatabaseFairing))
}

/// Attach everything that does not depend on how the database is provided.
fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(ConfigFairing)
        .attach(LoggerFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// Connect to the database named in the test configuration.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` must be configured to run database tests");
    mongodb::Client::with_uri_str(db_uri)
        .await
        .expect("failed to connect to the test database")
}

/// A fresh database name, so concurrently running tests never collide.
#[cfg(test)]
pub(crate) fn database() -> String {
    config::get_database_name(None)
}

/// Build a server backed by the given database, with voting open and images
/// written to a scratch directory unique to that database.
#[cfg(test)]
pub(crate) fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    rocket_for_phase(client, db_name, model::common::election::ElectionPhase::Ongoing)
}

/// As [`rocket_for_db`], with the election schedule placed so that it is
/// currently in the given phase.
#[cfg(test)]
pub(crate) fn rocket_for_phase(
    client: mongodb::Client,
    db_name: &str,
    phase: model::common::election::ElectionPhase,
) -> Rocket<Build> {
    let image_root = std::env::temp_dir().join(format!("council-vote-{db_name}"));
    let figment = rocket::Config::figment()
        .merge(("image_root", image_root))
        .merge((
            "election",
            model::common::election::ElectionSchedule::example_in(phase),
        ));
    let db = client.database(db_name);
    mount_api(rocket::custom(figment).manage(client).manage(db))
}
