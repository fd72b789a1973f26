//! Database repository for drivers.
//!
//! Owns license-number uniqueness and the cascade delete of dependent
//! performance records.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::drivers::{DriverCreateDBRequest, DriverDBResponse, DriverUpdateDBRequest},
};
use crate::api::models::drivers::DriverStatus;
use crate::types::DriverId;
use chrono::Utc;
use sqlx::{Connection, QueryBuilder, SqliteConnection};
use tracing::instrument;

/// Filter for listing drivers. Omitted fields are no-ops; filters compose
/// conjunctively.
#[derive(Debug, Clone, Default)]
pub struct DriverFilter {
    pub search: Option<String>,
    pub status: Option<DriverStatus>,
    pub sort_by: Option<String>,
}

/// Allow-list mapping from caller-supplied sort names to real columns.
///
/// Anything outside this set is ignored rather than interpolated, so a
/// hostile `sort_by` can never reach the SQL text.
fn sort_column(name: &str) -> Option<&'static str> {
    match name {
        "name" => Some("name"),
        "license_number" => Some("license_number"),
        "phone_number" => Some("phone_number"),
        "car_model" => Some("car_model"),
        "hire_date" => Some("hire_date"),
        "status" => Some("status"),
        "created_at" => Some("created_at"),
        "updated_at" => Some("updated_at"),
        _ => None,
    }
}

fn license_conflict(license_number: &str) -> DbError {
    DbError::UniqueViolation {
        constraint: Some("drivers.license_number".to_string()),
        message: format!("license number '{license_number}' is already registered"),
    }
}

pub struct Drivers<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Drivers<'c> {
    type CreateRequest = DriverCreateDBRequest;
    type UpdateRequest = DriverUpdateDBRequest;
    type Response = DriverDBResponse;
    type Id = DriverId;
    type Filter = DriverFilter;

    #[instrument(skip(self, request), fields(license = %request.license_number), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        // Friendly pre-check; the UNIQUE constraint below remains the
        // authoritative guard against concurrent creates.
        let taken = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drivers WHERE license_number = ?")
            .bind(&request.license_number)
            .fetch_one(&mut *tx)
            .await?;
        if taken > 0 {
            return Err(license_conflict(&request.license_number));
        }

        let driver = sqlx::query_as::<_, DriverDBResponse>(
            r#"
            INSERT INTO drivers (name, license_number, phone_number, car_model, hire_date, status, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.license_number)
        .bind(&request.phone_number)
        .bind(&request.car_model)
        .bind(request.hire_date)
        .bind(request.status)
        .bind(&request.email)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(driver)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let driver = sqlx::query_as::<_, DriverDBResponse>("SELECT * FROM drivers WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(driver)
    }

    #[instrument(skip(self, filter), fields(search = ?filter.search, sort_by = ?filter.sort_by), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM drivers WHERE 1 = 1");

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query
                .push(" AND (LOWER(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(license_number) LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }

        // Name ordering by default; unknown sort names degrade to no
        // explicit ordering.
        let column = match filter.sort_by.as_deref() {
            None => Some("name"),
            Some(requested) => sort_column(requested),
        };
        if let Some(column) = column {
            query.push(" ORDER BY ").push(column);
        }

        let drivers = query
            .build_query_as::<DriverDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;

        Ok(drivers)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        // Re-check uniqueness against all *other* drivers when the license
        // number is part of the patch.
        if let Some(license_number) = &request.license_number {
            let taken = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM drivers WHERE license_number = ? AND id != ?",
            )
            .bind(license_number)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            if taken > 0 {
                return Err(license_conflict(license_number));
            }
        }

        let driver = sqlx::query_as::<_, DriverDBResponse>(
            r#"
            UPDATE drivers SET
                name = COALESCE(?, name),
                license_number = COALESCE(?, license_number),
                phone_number = COALESCE(?, phone_number),
                car_model = COALESCE(?, car_model),
                hire_date = COALESCE(?, hire_date),
                status = COALESCE(?, status),
                email = COALESCE(?, email),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.license_number)
        .bind(&request.phone_number)
        .bind(&request.car_model)
        .bind(request.hire_date)
        .bind(request.status)
        .bind(&request.email)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        tx.commit().await?;
        Ok(driver)
    }

    /// Deletes the driver and all of its performance records in one
    /// transaction. A failed cascade leaves the driver intact.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM driver_performances WHERE driver_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM drivers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the cascade.
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}

impl<'c> Drivers<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Performances;
    use crate::db::models::performances::PerformanceCreateDBRequest;
    use chrono::NaiveDate;
    use sqlx::SqlitePool;

    fn driver_request(name: &str, license: &str) -> DriverCreateDBRequest {
        DriverCreateDBRequest {
            name: name.to_string(),
            license_number: license.to_string(),
            phone_number: "555-0100".to_string(),
            car_model: "Toyota Corolla".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2023, 4, 10).unwrap(),
            status: DriverStatus::Active,
            email: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_driver(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Drivers::new(&mut conn);

        let created = repo.create(&driver_request("Bob", "LIC1")).await.unwrap();
        assert_eq!(created.name, "Bob");
        assert_eq!(created.status, DriverStatus::Active);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.license_number, "LIC1");
        assert!(repo.get_by_id(created.id + 1000).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_license_rejected(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Drivers::new(&mut conn);

        repo.create(&driver_request("Bob", "LIC1")).await.unwrap();
        let err = repo.create(&driver_request("Bobby", "LIC1")).await.unwrap_err();

        assert!(err.violates_column("drivers.license_number"));

        // The first row must be untouched.
        let all = repo.list(&DriverFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Bob");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_partial_update(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Drivers::new(&mut conn);

        let created = repo.create(&driver_request("Bob", "LIC1")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                &DriverUpdateDBRequest {
                    status: Some(DriverStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, DriverStatus::Inactive);
        // Untouched fields survive the patch.
        assert_eq!(updated.name, "Bob");
        assert_eq!(updated.license_number, "LIC1");
        assert_eq!(updated.hire_date, created.hire_date);
        assert!(updated.updated_at > created.updated_at);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_empty_patch_only_bumps_updated_at(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Drivers::new(&mut conn);

        let created = repo.create(&driver_request("Bob", "LIC1")).await.unwrap();
        let updated = repo
            .update(created.id, &DriverUpdateDBRequest::default())
            .await
            .unwrap();

        assert_eq!(updated.name, created.name);
        assert_eq!(updated.license_number, created.license_number);
        assert_eq!(updated.phone_number, created.phone_number);
        assert_eq!(updated.car_model, created.car_model);
        assert_eq!(updated.status, created.status);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_license_collision(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Drivers::new(&mut conn);

        repo.create(&driver_request("Bob", "LIC1")).await.unwrap();
        let carol = repo.create(&driver_request("Carol", "LIC2")).await.unwrap();

        let err = repo
            .update(
                carol.id,
                &DriverUpdateDBRequest {
                    license_number: Some("LIC1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.violates_column("drivers.license_number"));

        // Re-submitting the driver's own license number is not a collision.
        let updated = repo
            .update(
                carol.id,
                &DriverUpdateDBRequest {
                    license_number: Some("LIC2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.license_number, "LIC2");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_driver(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Drivers::new(&mut conn);

        let err = repo
            .update(42, &DriverUpdateDBRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_cascades_performance_records(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();

        let driver = {
            let mut repo = Drivers::new(&mut conn);
            repo.create(&driver_request("Bob", "LIC1")).await.unwrap()
        };

        {
            let mut perf_repo = Performances::new(&mut conn);
            for day in 1..=3 {
                perf_repo
                    .create(&PerformanceCreateDBRequest {
                        driver_id: driver.id,
                        date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
                        rating: 4,
                        notes: None,
                    })
                    .await
                    .unwrap();
            }
        }

        let mut repo = Drivers::new(&mut conn);
        assert!(repo.delete(driver.id).await.unwrap());
        assert!(repo.get_by_id(driver.id).await.unwrap().is_none());

        // No orphan rows may remain.
        let orphans =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM driver_performances WHERE driver_id = ?")
                .bind(driver.id)
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(orphans, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_missing_driver(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Drivers::new(&mut conn);
        assert!(!repo.delete(42).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_compose(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Drivers::new(&mut conn);

        repo.create(&driver_request("Bob Smith", "LIC1")).await.unwrap();
        repo.create(&driver_request("Carol Jones", "LIC2")).await.unwrap();
        let mut dan = driver_request("Dan Smith", "LIC3");
        dan.status = DriverStatus::Inactive;
        repo.create(&dan).await.unwrap();

        // Case-insensitive substring on name OR license number.
        let smiths = repo
            .list(&DriverFilter {
                search: Some("smith".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(smiths.len(), 2);

        let by_license = repo
            .list(&DriverFilter {
                search: Some("lic2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_license.len(), 1);
        assert_eq!(by_license[0].name, "Carol Jones");

        // Search and status compose conjunctively.
        let inactive_smiths = repo
            .list(&DriverFilter {
                search: Some("smith".to_string()),
                status: Some(DriverStatus::Inactive),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(inactive_smiths.len(), 1);
        assert_eq!(inactive_smiths[0].name, "Dan Smith");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_sort_allow_list(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Drivers::new(&mut conn);

        repo.create(&driver_request("Carol", "LIC2")).await.unwrap();
        repo.create(&driver_request("Bob", "LIC1")).await.unwrap();

        let sorted = repo
            .list(&DriverFilter {
                sort_by: Some("name".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sorted[0].name, "Bob");
        assert_eq!(sorted[1].name, "Carol");

        // Absent sort_by defaults to name ordering.
        let defaulted = repo.list(&DriverFilter::default()).await.unwrap();
        assert_eq!(defaulted[0].name, "Bob");

        // Hostile or unknown sort names must neither error nor reach the SQL.
        for bogus in ["; DROP TABLE drivers", "__class__", "no_such_column"] {
            let result = repo
                .list(&DriverFilter {
                    sort_by: Some(bogus.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(result.len(), 2);
        }
    }
}
