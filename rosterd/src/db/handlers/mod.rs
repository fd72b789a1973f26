//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction, provides
//! strongly-typed CRUD operations, and returns models from
//! [`crate::db::models`]. [`Drivers`] and [`Performances`] implement the
//! common [`Repository`] trait; [`Users`] is a plain credential store with
//! only the operations registration and login need.

pub mod drivers;
pub mod performances;
pub mod repository;
pub mod users;

pub use drivers::{DriverFilter, Drivers};
pub use performances::{PerformanceFilter, Performances};
pub use repository::Repository;
pub use users::Users;
