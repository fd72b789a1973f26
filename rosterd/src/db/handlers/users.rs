//! Database repository for user credentials.
//!
//! Pure data access: rows are written at registration and read at login.
//! Token validation never touches this table.

use crate::api::models::users::Role;
use crate::db::{
    errors::Result,
    models::users::{UserCreateDBRequest, UserDBResponse},
};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    pub async fn create(&mut self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (username, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(&request.password_hash)
        .bind(request.role)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Number of admin accounts. Used by the bootstrap rule for admin registration.
    #[instrument(skip(self), err)]
    pub async fn count_admins(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(Role::Admin)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use sqlx::SqlitePool;

    fn user_request(username: &str, role: Role) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: username.to_string(),
            password_hash: "$argon2id$fake-hash".to_string(),
            role,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_fetch_user(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&user_request("alice", Role::Client)).await.unwrap();
        assert_eq!(created.username, "alice");
        assert_eq!(created.role, Role::Client);

        let fetched = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.password_hash, "$argon2id$fake-hash");

        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_username_is_unique_violation(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&user_request("alice", Role::Client)).await.unwrap();
        let err = repo.create(&user_request("alice", Role::Admin)).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(err.violates_column("users.username"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_count_admins(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        assert_eq!(repo.count_admins().await.unwrap(), 0);
        repo.create(&user_request("root", Role::Admin)).await.unwrap();
        repo.create(&user_request("alice", Role::Client)).await.unwrap();
        assert_eq!(repo.count_admins().await.unwrap(), 1);
    }
}
