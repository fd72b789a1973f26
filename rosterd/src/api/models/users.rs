//! API models for user identity and roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access role carried by every issued token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

/// The authenticated caller, as asserted by a validated bearer token.
///
/// Built entirely from token claims - no store lookup happens per request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
