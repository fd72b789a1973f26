//! Request guard: bearer-token extraction and validation.
//!
//! Every protected handler takes a [`CurrentUser`] argument. Extraction runs
//! before the handler body, so an unauthenticated call short-circuits with
//! 401 and no side effect occurs. Validation is purely cryptographic - the
//! store is never consulted here.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use tracing::{instrument, trace};

use crate::{
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
    AppState,
};

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Result<&str> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(Error::Unauthenticated { message: None })?;

    let value = header.to_str().map_err(|_| Error::Unauthenticated {
        message: Some("Invalid authorization header".to_string()),
    })?;

    value.strip_prefix("Bearer ").ok_or(Error::Unauthenticated {
        message: Some("Expected a bearer token".to_string()),
    })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts)?;
        let user = session::verify_session_token(token, &state.config)?;
        trace!("Authenticated bearer token for {}", user.username);
        Ok(user)
    }
}

/// Optional variant: absent credentials are `None`, present-but-invalid
/// credentials still fail. Used by registration to check whether an admin
/// is making the request.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>> {
        if parts.headers.get(axum::http::header::AUTHORIZATION).is_none() {
            return Ok(None);
        }
        <CurrentUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
