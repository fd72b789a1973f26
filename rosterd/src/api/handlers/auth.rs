use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::models::{
        auth::{LoginRequest, RegisterRequest, TokenResponse},
        users::{CurrentUser, Role},
    },
    auth::{password, session},
    db::{
        handlers::Users,
        models::users::UserCreateDBRequest,
    },
    errors::{Error, Result},
    AppState,
};

/// Register a new user account and issue a bearer token
///
/// The requested role defaults to `client`. Granting `admin` requires either
/// that no admin exists yet (first-user bootstrap) or that the request
/// itself carries a valid admin bearer token.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered successfully", body = TokenResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin role requested without authorization"),
        (status = 409, description = "Username already registered"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    // Validate password length
    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::Validation {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::Validation {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let role = request.role.unwrap_or(Role::Client);

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut tx);

    if role == Role::Admin {
        let caller_is_admin = caller.as_ref().map(CurrentUser::is_admin).unwrap_or(false);
        // Bootstrap: the very first admin may self-register.
        if !caller_is_admin && user_repo.count_admins().await? > 0 {
            return Err(Error::Forbidden {
                message: "Only an admin may grant the admin role".to_string(),
            });
        }
    }

    // Friendly duplicate check; the UNIQUE constraint on username is the
    // authoritative guard.
    if user_repo.get_by_username(&request.username).await?.is_some() {
        return Err(Error::Conflict {
            message: "Username already registered".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created = user_repo
        .create(&UserCreateDBRequest {
            username: request.username,
            password_hash,
            role,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let token = session::create_session_token(&created.username, created.role, &state.config)?;

    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token, created.role))))
}

/// Login with username and password, returning a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    let user = user_repo
        .get_by_username(&request.username)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Incorrect username or password".to_string()),
        })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Incorrect username or password".to_string()),
        });
    }

    let token = session::create_session_token(&user.username, user.role, &state.config)?;

    Ok(Json(TokenResponse::bearer(token, user.role)))
}
