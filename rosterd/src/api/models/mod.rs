//! Request/response data structures for API communication.

pub mod auth;
pub mod drivers;
pub mod performances;
pub mod users;
