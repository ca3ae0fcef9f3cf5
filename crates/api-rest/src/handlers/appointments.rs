use crate::dto::{page_meta, parse_id, AppointmentQuery, BookingBody, PageQuery, StatusBody};
use crate::error::ApiError;
use crate::extract::CurrentActor;
use crate::AppState;
use api_shared::ResponseEnvelope;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use clinic_core::{AppointmentStatus, BookingRequest};

#[utoipa::path(
    get,
    path = "/v2/appointments",
    params(AppointmentQuery),
    responses(
        (status = 200, description = "Page of appointments", body = ResponseEnvelope),
        (status = 403, description = "Caller is not front-desk staff", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let criteria = query.criteria()?;
    let page = state
        .appointments
        .list_all(&actor, &criteria, query.request(&state.cfg))?;
    Ok(Json(ResponseEnvelope::paged(
        "Appointments fetched successfully.",
        &page.items,
        page_meta(&page),
    )?))
}

#[utoipa::path(
    post,
    path = "/v2/appointments",
    request_body = BookingBody,
    responses(
        (status = 201, description = "Appointment booked", body = ResponseEnvelope),
        (status = 403, description = "Patient booking for someone else", body = ResponseEnvelope),
        (status = 404, description = "Doctor or patient not found", body = ResponseEnvelope),
        (status = 422, description = "Doctor or patient has the wrong role", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<BookingBody>,
) -> Result<(StatusCode, Json<ResponseEnvelope>), ApiError> {
    let request = BookingRequest::try_from(body)?;
    let appointment = state.appointments.create(&actor, request)?;
    Ok((
        StatusCode::CREATED,
        Json(ResponseEnvelope::with_data(
            "Appointment created successfully.",
            &appointment,
        )?),
    ))
}

#[utoipa::path(
    get,
    path = "/v2/appointment/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = ResponseEnvelope),
        (status = 404, description = "Not found", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let appointment = state.appointments.get(&actor, &id)?;
    Ok(Json(ResponseEnvelope::with_data(
        "Appointment fetched successfully.",
        &appointment,
    )?))
}

#[utoipa::path(
    patch,
    path = "/v2/appointment/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = StatusBody,
    responses(
        (status = 200, description = "Status changed", body = ResponseEnvelope),
        (status = 403, description = "Caller may not change this appointment", body = ResponseEnvelope),
        (status = 409, description = "Transition not allowed for caller", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let requested: AppointmentStatus = body.status.parse()?;
    let appointment = state.appointments.update_status(&actor, &id, requested)?;
    Ok(Json(ResponseEnvelope::with_data(
        "Appointment updated successfully.",
        &appointment,
    )?))
}

#[utoipa::path(
    delete,
    path = "/v2/appointment/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Deleted", body = ResponseEnvelope),
        (status = 403, description = "Caller is not an admin", body = ResponseEnvelope),
        (status = 404, description = "Not found", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    state.appointments.delete(&actor, &id)?;
    Ok(Json(ResponseEnvelope::success(
        "Appointment deleted successfully.",
    )))
}

#[utoipa::path(
    get,
    path = "/v2/user/{id}/appointments",
    params(("id" = String, Path, description = "User id"), PageQuery),
    responses(
        (status = 200, description = "Page of the user's appointments", body = ResponseEnvelope),
        (status = 403, description = "Caller may not see this user's appointments", body = ResponseEnvelope),
        (status = 404, description = "User not found", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn list_user_appointments(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let user_id = parse_id("id", &id)?;
    let page = state
        .appointments
        .list_for_user(&actor, &user_id, query.request(&state.cfg))?;
    Ok(Json(ResponseEnvelope::paged(
        "Appointments fetched successfully.",
        &page.items,
        page_meta(&page),
    )?))
}
