//! API request/response models for drivers.

use crate::api::models::performances::PerformanceResponse;
use crate::db::models::drivers::DriverDBResponse;
use crate::types::DriverId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Employment status of a driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
pub enum DriverStatus {
    Active,
    Inactive,
    Suspended,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DriverCreate {
    pub name: String,
    pub license_number: String,
    pub phone_number: String,
    pub car_model: String,
    pub hire_date: NaiveDate,
    /// Defaults to `Active` when omitted.
    pub status: Option<DriverStatus>,
    pub email: Option<String>,
}

/// Partial update: only fields present in the patch are applied.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DriverUpdate {
    pub name: Option<String>,
    pub license_number: Option<String>,
    pub phone_number: Option<String>,
    pub car_model: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<DriverStatus>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DriverResponse {
    pub id: DriverId,
    pub name: String,
    pub license_number: String,
    pub phone_number: String,
    pub car_model: String,
    pub hire_date: NaiveDate,
    pub status: DriverStatus,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Performance history, eagerly loaded on single-driver reads only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performances: Option<Vec<PerformanceResponse>>,
}

impl DriverResponse {
    pub fn with_performances(mut self, performances: Vec<PerformanceResponse>) -> Self {
        self.performances = Some(performances);
        self
    }
}

impl From<DriverDBResponse> for DriverResponse {
    fn from(db: DriverDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            license_number: db.license_number,
            phone_number: db.phone_number,
            car_model: db.car_model,
            hire_date: db.hire_date,
            status: db.status,
            email: db.email,
            created_at: db.created_at,
            updated_at: db.updated_at,
            performances: None,
        }
    }
}

/// Query parameters for listing drivers
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListDriversQuery {
    /// Case-insensitive substring match against name or license number
    pub search: Option<String>,
    /// Exact-match status filter
    pub status: Option<DriverStatus>,
    /// Ordering column, defaulting to `name`. Unknown names fall back to no
    /// explicit ordering.
    pub sort_by: Option<String>,
}
