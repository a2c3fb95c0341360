//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs are serialised in MongoDB's own format.
//! - Field names are snake_case.
//!
//! Each document type comes as a `Core` without an ID, aliased `NewX` for
//! insertion, and an `X` carrying its `_id` for reads.

pub mod admin;
pub mod candidate;
pub mod member;
pub mod voter;
