//! # rosterd: Fleet Driver Roster Service
//!
//! `rosterd` is a small control plane for a vehicle fleet's driver roster. It
//! provides a RESTful API for managing driver records and their performance
//! history, protected by token-based authentication.
//!
//! ## Overview
//!
//! Fleet operators need a single place to answer "who drives for us, in what
//! vehicle, and how are they doing?". This crate provides that: a driver
//! registry with uniqueness guarantees on license numbers, a per-driver
//! performance ledger, and a user store gating all mutations behind bearer
//! tokens.
//!
//! ### Request Flow
//!
//! Clients first register or log in via `/auth/*`, receiving a signed JWT.
//! Every roster endpoint then requires that token in an `Authorization:
//! Bearer` header; the [`auth`] extractor validates it before the handler
//! body runs, so unauthenticated requests are rejected with 401 and no side
//! effect. Handlers translate API models into database requests and delegate
//! to the repositories in [`db::handlers`], which own the data invariants
//! (license-number uniqueness, cascade deletion of performance records).
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use rosterd::{config, Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     rosterd::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::str::FromStr;

use axum::{
    routing::{get, post},
    Json, Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, Level};
use utoipa::OpenApi;

use crate::api::{handlers, ApiDoc};
pub use crate::config::Config;

/// Shared state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the rosterd database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the connection pool and bring the schema up to date.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    migrator().run(&pool).await?;

    Ok(pool)
}

/// Assemble the full application router.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/drivers",
            get(handlers::drivers::list_drivers).post(handlers::drivers::create_driver),
        )
        .route(
            "/drivers/{driver_id}",
            get(handlers::drivers::get_driver)
                .patch(handlers::drivers::update_driver)
                .delete(handlers::drivers::delete_driver),
        )
        .route(
            "/drivers/{driver_id}/performance",
            get(handlers::performances::list_performance)
                .post(handlers::performances::create_performance),
        )
        .route(
            "/performance/{performance_id}",
            get(handlers::performances::get_performance)
                .patch(handlers::performances::update_performance)
                .delete(handlers::performances::delete_performance),
        )
        .with_state(state);

    router.layer(CorsLayer::permissive()).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// The assembled service: router, pool, and configuration, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting roster service with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;

        Ok(Self::new_with_pool(config, pool))
    }

    /// Build the application around an existing pool. Migrations are assumed
    /// to have run already; used by tests that provision their own database.
    pub fn new_with_pool(config: Config, pool: SqlitePool) -> Self {
        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
        };
        let router = build_router(state);

        Self { router, config, pool }
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Roster service listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
