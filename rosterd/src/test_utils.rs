//! Test utilities for integration testing (available with `test-utils` feature).

use axum_test::TestServer;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::{
    api::models::users::Role,
    auth::{password, session},
    build_router,
    config::Config,
    db::{
        handlers::{Drivers, Repository, Users},
        models::{
            drivers::{DriverCreateDBRequest, DriverDBResponse},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
    AppState,
};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        port: 0,
        ..Config::default()
    }
}

/// Spin up an in-process test server over the given (already migrated) pool.
pub fn create_test_server(pool: SqlitePool) -> TestServer {
    let state = AppState {
        db: pool,
        config: create_test_config(),
    };
    TestServer::new(build_router(state)).expect("Failed to create test server")
}

/// Insert a user directly into the store, bypassing the registration
/// endpoint. Password is always [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &SqlitePool, username: &str, role: Role) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let password_hash = password::hash_password(TEST_PASSWORD).expect("Failed to hash password");

    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash,
            role,
        })
        .await
        .expect("Failed to create test user")
}

/// Mint a valid bearer token without going through the login endpoint.
pub fn create_test_token(username: &str, role: Role) -> String {
    session::create_session_token(username, role, &create_test_config())
        .expect("Failed to create test token")
}

/// Insert a driver with plausible defaults, overriding only the license
/// number so tests can create several without colliding.
pub async fn create_test_driver(pool: &SqlitePool, license_number: &str) -> DriverDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");

    Drivers::new(&mut conn)
        .create(&DriverCreateDBRequest {
            name: "Test Driver".to_string(),
            license_number: license_number.to_string(),
            phone_number: "555-0100".to_string(),
            car_model: "Toyota Corolla".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2023, 6, 1).expect("valid date"),
            status: crate::api::models::drivers::DriverStatus::Active,
            email: None,
        })
        .await
        .expect("Failed to create test driver")
}
