//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx over SQLite,
//! following the repository pattern:
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! Repositories wrap a connection or transaction and encapsulate all
//! database access for one entity type. Multi-statement operations (the
//! license-uniqueness pre-check, the cascade delete) run inside a
//! transaction so they commit or roll back together.
//!
//! Migrations are managed by SQLx and located in the `migrations/`
//! directory; [`crate::migrator`] provides access to the migrator.

pub mod errors;
pub mod handlers;
pub mod models;
