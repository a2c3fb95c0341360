//! Types exchanged with API clients.

pub mod admin;
pub mod auth;
pub mod ballot;
pub mod candidate;
pub mod id;
pub mod results;
pub mod voter;
