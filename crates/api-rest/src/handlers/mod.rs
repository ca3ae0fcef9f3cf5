pub mod appointments;
pub mod users;

use api_shared::{HealthRes, HealthService};
use axum::response::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint. Needs no API key.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}
