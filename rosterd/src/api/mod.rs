//! HTTP API surface: handlers, request/response models, and the OpenAPI
//! document served at `/api-docs/openapi.json`.

pub mod handlers;
pub mod models;

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::drivers::create_driver,
        handlers::drivers::list_drivers,
        handlers::drivers::get_driver,
        handlers::drivers::update_driver,
        handlers::drivers::delete_driver,
        handlers::performances::create_performance,
        handlers::performances::list_performance,
        handlers::performances::get_performance,
        handlers::performances::update_performance,
        handlers::performances::delete_performance,
    ),
    components(schemas(
        models::auth::RegisterRequest,
        models::auth::LoginRequest,
        models::auth::TokenResponse,
        models::users::Role,
        models::drivers::DriverCreate,
        models::drivers::DriverUpdate,
        models::drivers::DriverResponse,
        models::drivers::DriverStatus,
        models::performances::PerformanceCreate,
        models::performances::PerformanceUpdate,
        models::performances::PerformanceResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "User registration and login"),
        (name = "drivers", description = "Driver roster management"),
        (name = "performance", description = "Driver performance records"),
    ),
    info(
        title = "rosterd API",
        description = "Fleet driver roster and performance tracking service",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
