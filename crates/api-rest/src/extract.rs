//! Request authentication.
//!
//! Every endpoint apart from `/health` needs the deployment API key in `x-api-key`. The
//! acting user is named by `x-user-id` and resolved against the user store once per request.

use crate::error::ApiError;
use crate::AppState;
use api_shared::{validate_api_key, AuthError, API_KEY_HEADER, USER_ID_HEADER};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use clinic_core::Actor;

/// The authenticated caller. Rejects the request if `x-user-id` is absent.
#[derive(Clone, Debug)]
pub struct CurrentActor(pub Actor);

/// The caller, if one was named. Used only by public registration.
#[derive(Clone, Debug)]
pub struct OptionalActor(pub Option<Actor>);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn resolve(parts: &Parts, state: &AppState) -> Result<Option<Actor>, ApiError> {
    validate_api_key(&state.api_key, header(parts, API_KEY_HEADER))?;

    let Some(user_id) = header(parts, USER_ID_HEADER) else {
        return Ok(None);
    };
    let actor = state
        .users
        .resolve_actor(user_id)
        .map_err(|_| AuthError::UnknownUser(user_id.to_owned()))?;
    Ok(Some(actor))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state)?
            .map(CurrentActor)
            .ok_or_else(|| AuthError::MissingUser.into())
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for OptionalActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).map(OptionalActor)
    }
}
