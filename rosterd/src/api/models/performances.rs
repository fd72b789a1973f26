//! API request/response models for performance records.

use crate::db::models::performances::PerformanceDBResponse;
use crate::types::{DriverId, PerformanceId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PerformanceCreate {
    pub date: NaiveDate,
    /// Expected range 1-5, enforced at this boundary.
    pub rating: i64,
    pub notes: Option<String>,
}

/// Partial update: only fields present in the patch are applied.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PerformanceUpdate {
    pub date: Option<NaiveDate>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PerformanceResponse {
    pub id: PerformanceId,
    pub driver_id: DriverId,
    pub date: NaiveDate,
    pub rating: i64,
    pub notes: Option<String>,
}

impl From<PerformanceDBResponse> for PerformanceResponse {
    fn from(db: PerformanceDBResponse) -> Self {
        Self {
            id: db.id,
            driver_id: db.driver_id,
            date: db.date,
            rating: db.rating,
            notes: db.notes,
        }
    }
}
