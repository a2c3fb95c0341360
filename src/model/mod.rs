//! Data model.
//!
//! - [`api`]: request and response bodies, serialised in an API-friendly way.
//! - [`common`]: domain types and pure logic shared by both representations.
//! - [`db`]: documents as stored in MongoDB.
//! - [`mongodb`]: collection plumbing and driver helpers.

pub mod api;
pub mod common;
pub mod db;
pub mod mongodb;
