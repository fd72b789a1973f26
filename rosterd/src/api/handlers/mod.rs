//! HTTP request handlers.
//!
//! Handlers validate input, translate between API and database models, and
//! delegate persistence to the repositories in [`crate::db::handlers`].

pub mod auth;
pub mod drivers;
pub mod performances;
