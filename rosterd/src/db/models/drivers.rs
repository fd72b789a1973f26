//! Database models for drivers.

use crate::api::models::drivers::{DriverCreate, DriverStatus, DriverUpdate};
use crate::types::DriverId;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database request for creating a new driver
#[derive(Debug, Clone)]
pub struct DriverCreateDBRequest {
    pub name: String,
    pub license_number: String,
    pub phone_number: String,
    pub car_model: String,
    pub hire_date: NaiveDate,
    pub status: DriverStatus,
    pub email: Option<String>,
}

impl From<DriverCreate> for DriverCreateDBRequest {
    fn from(api: DriverCreate) -> Self {
        Self {
            name: api.name,
            license_number: api.license_number,
            phone_number: api.phone_number,
            car_model: api.car_model,
            hire_date: api.hire_date,
            status: api.status.unwrap_or(DriverStatus::Active),
            email: api.email,
        }
    }
}

/// Database request for a partial driver update. `None` fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct DriverUpdateDBRequest {
    pub name: Option<String>,
    pub license_number: Option<String>,
    pub phone_number: Option<String>,
    pub car_model: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<DriverStatus>,
    pub email: Option<String>,
}

impl From<DriverUpdate> for DriverUpdateDBRequest {
    fn from(api: DriverUpdate) -> Self {
        Self {
            name: api.name,
            license_number: api.license_number,
            phone_number: api.phone_number,
            car_model: api.car_model,
            hire_date: api.hire_date,
            status: api.status,
            email: api.email,
        }
    }
}

/// Database response for a driver row
#[derive(Debug, Clone, FromRow)]
pub struct DriverDBResponse {
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
}
