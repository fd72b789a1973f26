//! Shared identifier types.
//!
//! All entities use store-assigned 64-bit integer identifiers.

/// Identifier for a user account.
pub type UserId = i64;

/// Identifier for a driver record.
pub type DriverId = i64;

/// Identifier for a performance record.
pub type PerformanceId = i64;
