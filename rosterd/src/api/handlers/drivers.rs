use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        drivers::{DriverCreate, DriverResponse, DriverUpdate, ListDriversQuery},
        performances::PerformanceResponse,
        users::CurrentUser,
    },
    db::{
        errors::DbError,
        handlers::{DriverFilter, Drivers, PerformanceFilter, Performances, Repository},
    },
    errors::{Error, Result},
    types::DriverId,
    AppState,
};

fn driver_not_found(id: DriverId) -> Error {
    Error::NotFound {
        resource: "Driver".to_string(),
        id: id.to_string(),
    }
}

/// Create a new driver
#[utoipa::path(
    post,
    path = "/drivers",
    request_body = DriverCreate,
    tag = "drivers",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Driver created", body = DriverResponse),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "License number already registered"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username))]
pub async fn create_driver(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<DriverCreate>,
) -> Result<(StatusCode, Json<DriverResponse>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut driver_repo = Drivers::new(&mut conn);

    let created = driver_repo.create(&request.into()).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List drivers with optional filtering and sorting
#[utoipa::path(
    get,
    path = "/drivers",
    params(ListDriversQuery),
    tag = "drivers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of drivers", body = Vec<DriverResponse>),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username))]
pub async fn list_drivers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListDriversQuery>,
) -> Result<Json<Vec<DriverResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut driver_repo = Drivers::new(&mut conn);

    let drivers = driver_repo
        .list(&DriverFilter {
            search: query.search,
            status: query.status,
            sort_by: query.sort_by,
        })
        .await?;

    Ok(Json(drivers.into_iter().map(Into::into).collect()))
}

/// Get a single driver, including its performance history
#[utoipa::path(
    get,
    path = "/drivers/{driver_id}",
    params(("driver_id" = i64, Path, description = "Driver ID")),
    tag = "drivers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Driver details", body = DriverResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Driver not found"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username, driver_id))]
pub async fn get_driver(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(driver_id): Path<DriverId>,
) -> Result<Json<DriverResponse>> {
    // Both reads run in one transaction so a concurrent delete cannot leave
    // us serializing a driver with a fabricated empty history.
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let driver = Drivers::new(&mut tx)
        .get_by_id(driver_id)
        .await?
        .ok_or_else(|| driver_not_found(driver_id))?;

    let performances = Performances::new(&mut tx)
        .list(&PerformanceFilter {
            driver_id: Some(driver_id),
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let response = DriverResponse::from(driver)
        .with_performances(performances.into_iter().map(PerformanceResponse::from).collect());

    Ok(Json(response))
}

/// Partially update a driver
#[utoipa::path(
    patch,
    path = "/drivers/{driver_id}",
    params(("driver_id" = i64, Path, description = "Driver ID")),
    request_body = DriverUpdate,
    tag = "drivers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Driver updated", body = DriverResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Driver not found"),
        (status = 409, description = "License number already registered"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username, driver_id))]
pub async fn update_driver(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(driver_id): Path<DriverId>,
    Json(request): Json<DriverUpdate>,
) -> Result<Json<DriverResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut driver_repo = Drivers::new(&mut conn);

    let updated = driver_repo
        .update(driver_id, &request.into())
        .await
        .map_err(|e| match e {
            DbError::NotFound => driver_not_found(driver_id),
            other => Error::Database(other),
        })?;

    Ok(Json(updated.into()))
}

/// Delete a driver and all of its performance records
#[utoipa::path(
    delete,
    path = "/drivers/{driver_id}",
    params(("driver_id" = i64, Path, description = "Driver ID")),
    tag = "drivers",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Driver deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Driver not found"),
    )
)]
#[tracing::instrument(skip_all, fields(username = %current_user.username, driver_id))]
pub async fn delete_driver(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(driver_id): Path<DriverId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut driver_repo = Drivers::new(&mut conn);

    if !driver_repo.delete(driver_id).await? {
        return Err(driver_not_found(driver_id));
    }

    Ok(StatusCode::NO_CONTENT)
}
