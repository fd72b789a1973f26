//! API request/response models for authentication.

use crate::api::models::users::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// Requested role. Defaults to `client`; see the admin-grant rules in
    /// the register handler.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued bearer credential plus the role embedded in it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
}

impl TokenResponse {
    pub fn bearer(access_token: String, role: Role) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            role,
        }
    }
}
