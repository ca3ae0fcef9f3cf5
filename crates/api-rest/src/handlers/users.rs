use crate::dto::{page_meta, NewUserBody, UserQuery, UserUpdateBody};
use crate::error::ApiError;
use crate::extract::{CurrentActor, OptionalActor};
use crate::AppState;
use api_shared::ResponseEnvelope;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use clinic_core::{NewUser, UserUpdate};

#[utoipa::path(
    get,
    path = "/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Page of users", body = ResponseEnvelope),
        (status = 403, description = "Caller is not front-desk staff", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<UserQuery>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let criteria = query.criteria()?;
    let page = state
        .users
        .list(&actor, &criteria, query.request(&state.cfg))?;
    Ok(Json(ResponseEnvelope::paged(
        "Users fetched successfully.",
        &page.items,
        page_meta(&page),
    )?))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = NewUserBody,
    responses(
        (status = 201, description = "User registered", body = ResponseEnvelope),
        (status = 400, description = "Validation failed", body = ResponseEnvelope),
        (status = 409, description = "User name, email or phone already taken", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
    Json(body): Json<NewUserBody>,
) -> Result<(StatusCode, Json<ResponseEnvelope>), ApiError> {
    let input = NewUser::try_from(body)?;
    let user = state.users.register(actor.as_ref(), input)?;
    Ok((
        StatusCode::CREATED,
        Json(ResponseEnvelope::with_data("User created successfully.", &user)?),
    ))
}

#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = ResponseEnvelope),
        (status = 404, description = "Not found", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let user = state.users.get(&actor, &id)?;
    Ok(Json(ResponseEnvelope::with_data(
        "User fetched successfully.",
        &user,
    )?))
}

#[utoipa::path(
    patch,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserUpdateBody,
    responses(
        (status = 200, description = "User updated", body = ResponseEnvelope),
        (status = 403, description = "Caller may not update this user", body = ResponseEnvelope),
        (status = 409, description = "Changed fields clash with another user", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(body): Json<UserUpdateBody>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let update = UserUpdate::try_from(body)?;
    let user = state.users.update(&actor, &id, update)?;
    Ok(Json(ResponseEnvelope::with_data(
        "User updated successfully.",
        &user,
    )?))
}

#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = ResponseEnvelope),
        (status = 403, description = "Caller may not delete this user", body = ResponseEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    state.users.delete(&actor, &id)?;
    Ok(Json(ResponseEnvelope::success("User deleted successfully.")))
}
