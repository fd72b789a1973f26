//! Database repository for driver performance records.
//!
//! Rows live strictly nested inside their parent driver; existence of the
//! parent is checked by callers through the driver repository before insert.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::performances::{PerformanceCreateDBRequest, PerformanceDBResponse, PerformanceUpdateDBRequest},
};
use crate::types::{DriverId, PerformanceId};
use chrono::Utc;
use sqlx::{Connection, SqliteConnection};
use tracing::instrument;

/// Filter for listing performance records.
#[derive(Debug, Clone, Default)]
pub struct PerformanceFilter {
    pub driver_id: Option<DriverId>,
}

pub struct Performances<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Performances<'c> {
    type CreateRequest = PerformanceCreateDBRequest;
    type UpdateRequest = PerformanceUpdateDBRequest;
    type Response = PerformanceDBResponse;
    type Id = PerformanceId;
    type Filter = PerformanceFilter;

    #[instrument(skip(self, request), fields(driver_id = request.driver_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, PerformanceDBResponse>(
            r#"
            INSERT INTO driver_performances (driver_id, date, rating, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.driver_id)
        .bind(request.date)
        .bind(request.rating)
        .bind(&request.notes)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(record)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let record = sqlx::query_as::<_, PerformanceDBResponse>(
            "SELECT * FROM driver_performances WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(record)
    }

    /// Ordered by date then id for deterministic output.
    #[instrument(skip(self, filter), fields(driver_id = ?filter.driver_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let records = match filter.driver_id {
            Some(driver_id) => {
                sqlx::query_as::<_, PerformanceDBResponse>(
                    "SELECT * FROM driver_performances WHERE driver_id = ? ORDER BY date ASC, id ASC",
                )
                .bind(driver_id)
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, PerformanceDBResponse>(
                    "SELECT * FROM driver_performances ORDER BY date ASC, id ASC",
                )
                .fetch_all(&mut *self.db)
                .await?
            }
        };

        Ok(records)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let record = sqlx::query_as::<_, PerformanceDBResponse>(
            r#"
            UPDATE driver_performances SET
                date = COALESCE(?, date),
                rating = COALESCE(?, rating),
                notes = COALESCE(?, notes),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(request.date)
        .bind(request.rating)
        .bind(&request.notes)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        tx.commit().await?;
        Ok(record)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM driver_performances WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Performances<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::drivers::DriverStatus;
    use crate::db::handlers::Drivers;
    use crate::db::models::drivers::DriverCreateDBRequest;
    use chrono::NaiveDate;
    use sqlx::SqlitePool;

    async fn seed_driver(conn: &mut SqliteConnection) -> DriverId {
        let mut repo = Drivers::new(conn);
        repo.create(&DriverCreateDBRequest {
            name: "Bob".to_string(),
            license_number: "LIC1".to_string(),
            phone_number: "555-0100".to_string(),
            car_model: "Toyota Corolla".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2023, 4, 10).unwrap(),
            status: DriverStatus::Active,
            email: None,
        })
        .await
        .unwrap()
        .id
    }

    fn record(driver_id: DriverId, day: u32, rating: i64) -> PerformanceCreateDBRequest {
        PerformanceCreateDBRequest {
            driver_id,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            rating,
            notes: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_record(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let driver_id = seed_driver(&mut conn).await;

        let mut repo = Performances::new(&mut conn);
        let created = repo.create(&record(driver_id, 2, 5)).await.unwrap();
        assert_eq!(created.driver_id, driver_id);
        assert_eq!(created.rating, 5);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert!(repo.get_by_id(created.id + 1000).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_insert_without_driver_is_fk_violation(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Performances::new(&mut conn);

        let err = repo.create(&record(999, 2, 5)).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_by_driver_ordered_by_date(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let driver_id = seed_driver(&mut conn).await;

        let mut repo = Performances::new(&mut conn);
        repo.create(&record(driver_id, 20, 3)).await.unwrap();
        repo.create(&record(driver_id, 5, 4)).await.unwrap();
        repo.create(&record(driver_id, 12, 5)).await.unwrap();

        let records = repo
            .list(&PerformanceFilter {
                driver_id: Some(driver_id),
            })
            .await
            .unwrap();

        let days: Vec<u32> = records
            .iter()
            .map(|r| chrono::Datelike::day(&r.date))
            .collect();
        assert_eq!(days, vec![5, 12, 20]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_partial_update_record(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let driver_id = seed_driver(&mut conn).await;

        let mut repo = Performances::new(&mut conn);
        let created = repo
            .create(&PerformanceCreateDBRequest {
                notes: Some("smooth shift".to_string()),
                ..record(driver_id, 2, 3)
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                &PerformanceUpdateDBRequest {
                    rating: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.rating, 5);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.notes.as_deref(), Some("smooth shift"));

        let err = repo
            .update(created.id + 1000, &PerformanceUpdateDBRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_record(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let driver_id = seed_driver(&mut conn).await;

        let mut repo = Performances::new(&mut conn);
        let created = repo.create(&record(driver_id, 2, 4)).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        // Removal is idempotent from the store's perspective.
        assert!(!repo.delete(created.id).await.unwrap());
    }
}
