//! # API REST
//!
//! REST API implementation for the clinic scheduling backend.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON envelopes, CORS, header authentication)
//!
//! Uses `api-shared` for common types and utilities and `clinic-core` for everything else.

#![warn(rust_2018_idioms)]

mod dto;
mod error;
mod extract;
mod handlers;

pub use error::ApiError;
pub use extract::{CurrentActor, OptionalActor};

use axum::{
    routing::{get, patch},
    Router,
};
use clinic_core::repositories::{InMemoryAppointments, InMemoryUsers};
use clinic_core::{AppointmentService, CoreConfig, UserService};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub appointments: AppointmentService,
    pub users: UserService,
    pub api_key: Arc<str>,
}

impl AppState {
    /// State backed by fresh in-memory repositories.
    pub fn in_memory(cfg: Arc<CoreConfig>, api_key: impl Into<Arc<str>>) -> Self {
        let users = Arc::new(InMemoryUsers::new());
        let appointments = Arc::new(InMemoryAppointments::new());
        Self {
            appointments: AppointmentService::new(cfg.clone(), appointments, users.clone()),
            users: UserService::new(cfg.clone(), users),
            api_key: api_key.into(),
            cfg,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::get_appointment,
        handlers::appointments::update_appointment,
        handlers::appointments::delete_appointment,
        handlers::appointments::list_user_appointments,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ResponseEnvelope,
        api_shared::ResponseStatus,
        dto::BookingBody,
        dto::StatusBody,
        dto::NewUserBody,
        dto::UserUpdateBody,
    ))
)]
pub struct ApiDoc;

/// Builds the full REST application, Swagger UI included.
pub fn router(state: AppState) -> Router {
    use handlers::{appointments, users};

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/v2/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/v2/appointment/:id",
            get(appointments::get_appointment)
                .patch(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(
            "/v2/user/:id/appointments",
            get(appointments::list_user_appointments),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/user/:id",
            patch(users::update_user)
                .get(users::get_user)
                .delete(users::delete_user),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the REST application until the server stops.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("++ Serving clinic REST API on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
