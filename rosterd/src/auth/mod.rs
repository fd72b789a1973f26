//! Authentication layer: password hashing, bearer-token sessions, and the
//! per-request guard.
//!
//! - [`password`]: Argon2id hashing and verification of stored digests
//! - [`session`]: signed, time-bounded JWTs carrying `{subject, role}`
//! - [`current_user`]: the extractor that validates the bearer token before
//!   any protected handler runs

pub mod current_user;
pub mod password;
pub mod session;
