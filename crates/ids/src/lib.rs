//! Record identifier utilities.
//!
//! Users and appointments are keyed by a short random identifier: a fixed number of
//! characters drawn from the URL-safe base64 alphabet (`A-Z`, `a-z`, `0-9`, `-`, `_`).
//!
//! ## Generation
//! Candidates come from the operating system's CSPRNG. 16 random bytes are encoded as
//! URL-safe base64 without padding and truncated to the requested length, so a 16-character
//! identifier carries 96 bits of entropy.
//!
//! ## Uniqueness
//! This crate holds no state and performs no I/O. [`IdService::generate_unique`] takes an
//! existence check supplied by the caller (usually a storage lookup) and regenerates while
//! that check reports a collision. The loop is bounded: once `max_attempts` candidates have
//! all collided, generation fails with [`IdError::Exhausted`] instead of spinning.
//!
//! The existence check is best-effort. Storage must still enforce uniqueness on insert,
//! because another writer can claim a candidate between the check and the write.

mod service;

pub use service::{IdService, ShortId, DEFAULT_ID_LENGTH, MAX_ID_LENGTH};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Every generated candidate collided with an existing identifier
    #[error("identifier generation gave up after {attempts} colliding attempts")]
    Exhausted { attempts: u32 },
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
