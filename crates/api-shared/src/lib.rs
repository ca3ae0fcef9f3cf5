//! # API Shared
//!
//! Shared utilities and definitions for the clinic APIs.
//!
//! Contains:
//! - The JSON response envelope
//! - Shared services like `HealthService`
//! - Authentication utilities (API key and acting-user headers)

pub mod auth;
pub mod envelope;
pub mod health;

pub use auth::{validate_api_key, AuthError, API_KEY_HEADER, USER_ID_HEADER};
pub use envelope::{PageMeta, ResponseEnvelope, ResponseStatus};
pub use health::{HealthRes, HealthService};
