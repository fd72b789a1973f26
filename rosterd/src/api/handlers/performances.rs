use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        performances::{PerformanceCreate, PerformanceResponse, PerformanceUpdate},
        users::CurrentUser,
    },
    db::{
        errors::DbError,
        handlers::{Drivers, PerformanceFilter, Performances, Repository},
        models::performances::PerformanceCreateDBRequest,
    },
    errors::{Error, Result},
    types::{DriverId, PerformanceId},
    AppState,
};

const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

fn validate_rating(rating: i64) -> Result<()> {
    if !RATING_RANGE.contains(&rating) {
        return Err(Error::Validation {
            message: format!("Rating must be between 1 and 5, got {rating}"),
        });
    }
    Ok(())
}

fn driver_not_found(id: DriverId) -> Error {
    Error::NotFound {
        resource: "Driver".to_string(),
        id: id.to_string(),
    }
}

fn performance_not_found(id: PerformanceId) -> Error {
    Error::NotFound {
        resource: "Performance record".to_string(),
        id: id.to_string(),
    }
}

/// Record a performance entry for a driver
#[utoipa::path(
    post,
    path = "/drivers/{driver_id}/performance",
    params(("driver_id" = i64, Path, description = "Driver ID")),
    request_body = PerformanceCreate,
    tag = "performance",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Performance record created", body = PerformanceResponse),
        (status = 400, description = "Rating out of range"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Driver not found"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username, driver_id))]
pub async fn create_performance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(driver_id): Path<DriverId>,
    Json(request): Json<PerformanceCreate>,
) -> Result<(StatusCode, Json<PerformanceResponse>)> {
    validate_rating(request.rating)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // Distinguish a missing parent from other failures up front; the foreign
    // key on driver_id still backstops a concurrent delete.
    Drivers::new(&mut conn)
        .get_by_id(driver_id)
        .await?
        .ok_or_else(|| driver_not_found(driver_id))?;

    let created = Performances::new(&mut conn)
        .create(&PerformanceCreateDBRequest::new(driver_id, request))
        .await
        .map_err(|e| match e {
            DbError::ForeignKeyViolation { .. } => driver_not_found(driver_id),
            other => Error::Database(other),
        })?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List a driver's performance records, oldest first
#[utoipa::path(
    get,
    path = "/drivers/{driver_id}/performance",
    params(("driver_id" = i64, Path, description = "Driver ID")),
    tag = "performance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Performance records for the driver", body = Vec<PerformanceResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Driver not found"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username, driver_id))]
pub async fn list_performance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(driver_id): Path<DriverId>,
) -> Result<Json<Vec<PerformanceResponse>>> {
    // Existence check and list share a transaction; a driver deleted in
    // between must read as 404, not as an empty history.
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    Drivers::new(&mut tx)
        .get_by_id(driver_id)
        .await?
        .ok_or_else(|| driver_not_found(driver_id))?;

    let records = Performances::new(&mut tx)
        .list(&PerformanceFilter {
            driver_id: Some(driver_id),
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Get a single performance record
#[utoipa::path(
    get,
    path = "/performance/{performance_id}",
    params(("performance_id" = i64, Path, description = "Performance record ID")),
    tag = "performance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Performance record", body = PerformanceResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Performance record not found"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username, performance_id))]
pub async fn get_performance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(performance_id): Path<PerformanceId>,
) -> Result<Json<PerformanceResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let record = Performances::new(&mut conn)
        .get_by_id(performance_id)
        .await?
        .ok_or_else(|| performance_not_found(performance_id))?;

    Ok(Json(record.into()))
}

/// Partially update a performance record
#[utoipa::path(
    patch,
    path = "/performance/{performance_id}",
    params(("performance_id" = i64, Path, description = "Performance record ID")),
    request_body = PerformanceUpdate,
    tag = "performance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Performance record updated", body = PerformanceResponse),
        (status = 400, description = "Rating out of range"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Performance record not found"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username, performance_id))]
pub async fn update_performance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(performance_id): Path<PerformanceId>,
    Json(request): Json<PerformanceUpdate>,
) -> Result<Json<PerformanceResponse>> {
    if let Some(rating) = request.rating {
        validate_rating(rating)?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let updated = Performances::new(&mut conn)
        .update(performance_id, &request.into())
        .await
        .map_err(|e| match e {
            DbError::NotFound => performance_not_found(performance_id),
            other => Error::Database(other),
        })?;

    Ok(Json(updated.into()))
}

/// Delete a performance record
#[utoipa::path(
    delete,
    path = "/performance/{performance_id}",
    params(("performance_id" = i64, Path, description = "Performance record ID")),
    tag = "performance",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Performance record deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Performance record not found"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username, performance_id))]
pub async fn delete_performance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(performance_id): Path<PerformanceId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Performances::new(&mut conn).delete(performance_id).await? {
        return Err(performance_not_found(performance_id));
    }

    Ok(StatusCode::NO_CONTENT)
}
