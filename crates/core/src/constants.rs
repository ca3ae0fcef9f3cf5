//! Defaults used throughout the clinic core crate.

/// Length of generated appointment and user identifiers.
pub const DEFAULT_ID_LENGTH: usize = clinic_ids::DEFAULT_ID_LENGTH;

/// Upper bound on identifier regeneration when a candidate collides.
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 32;

/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a listing request may ask for.
pub const MAX_PAGE_SIZE: usize = 100;
