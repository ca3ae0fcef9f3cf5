use api_shared::{AuthError, ResponseEnvelope};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use clinic_core::{ClinicError, IdError, PolicyError};

/// Everything a handler can fail with, mapped onto HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Clinic(#[from] ClinicError),

    /// Malformed query or body values caught before reaching a service.
    #[error("{0}")]
    BadRequest(String),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status and short category label for the envelope's `error` field.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Auth(_) => (StatusCode::UNAUTHORIZED, "Unauthenticated"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            ApiError::Encode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error"),
            ApiError::Clinic(err) => match err {
                ClinicError::Policy(policy) => match policy {
                    PolicyError::Unauthorized(_) => (StatusCode::FORBIDDEN, "Unauthorized Access"),
                    PolicyError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
                    PolicyError::IllegalTransition { .. } => {
                        (StatusCode::CONFLICT, "Illegal Transition")
                    }
                    PolicyError::InvalidRole { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "Invalid Role")
                    }
                    PolicyError::UnresolvedRole(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
                },
                ClinicError::AlreadyExists(_) => (StatusCode::CONFLICT, "Already Exists"),
                ClinicError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
                ClinicError::Identifier(IdError::Exhausted { .. }) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Identifier Space Exhausted",
                ),
                ClinicError::Identifier(_) | ClinicError::SeedRead(_) | ClinicError::SeedParse(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label) = self.classify();
        let message = if status.is_server_error() {
            tracing::error!("request failed: {self}");
            "An unexpected error occurred.".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ResponseEnvelope::error(message, label))).into_response()
    }
}
