//! Database record structures matching table schemas.

pub mod drivers;
pub mod performances;
pub mod users;
