//! Database models for performance records.

use crate::api::models::performances::{PerformanceCreate, PerformanceUpdate};
use crate::types::{DriverId, PerformanceId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database request for creating a performance record under an existing driver
#[derive(Debug, Clone)]
pub struct PerformanceCreateDBRequest {
    pub driver_id: DriverId,
    pub date: NaiveDate,
    pub rating: i64,
    pub notes: Option<String>,
}

impl PerformanceCreateDBRequest {
    pub fn new(driver_id: DriverId, api: PerformanceCreate) -> Self {
        Self {
            driver_id,
            date: api.date,
            rating: api.rating,
            notes: api.notes,
        }
    }
}

/// Database request for a partial performance update. `None` fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct PerformanceUpdateDBRequest {
    pub date: Option<NaiveDate>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
}

impl From<PerformanceUpdate> for PerformanceUpdateDBRequest {
    fn from(api: PerformanceUpdate) -> Self {
        Self {
            date: api.date,
            rating: api.rating,
            notes: api.notes,
        }
    }
}

/// Database response for a performance row
#[derive(Debug, Clone, FromRow)]
pub struct PerformanceDBResponse {
    pub id: PerformanceId,
    pub driver_id: DriverId,
    pub date: NaiveDate,
    pub rating: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
