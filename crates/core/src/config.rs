//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services
//! behind an `Arc`. Nothing in the request path reads environment variables.

use crate::constants::{DEFAULT_ID_LENGTH, DEFAULT_MAX_ID_ATTEMPTS, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::{ClinicError, ClinicResult};
use clinic_ids::IdService;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    ids: IdService,
    default_page_size: usize,
    max_page_size: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// All values must be non-zero and the default page size may not exceed the maximum.
    pub fn new(
        id_length: usize,
        max_id_attempts: u32,
        default_page_size: usize,
        max_page_size: usize,
    ) -> ClinicResult<Self> {
        let ids = IdService::new(id_length, max_id_attempts)?;

        if default_page_size == 0 || max_page_size == 0 {
            return Err(ClinicError::InvalidInput(
                "page sizes must be greater than zero".into(),
            ));
        }
        if default_page_size > max_page_size {
            return Err(ClinicError::InvalidInput(format!(
                "default page size {default_page_size} exceeds maximum page size {max_page_size}"
            )));
        }

        Ok(Self {
            ids,
            default_page_size,
            max_page_size,
        })
    }

    pub fn id_length(&self) -> usize {
        self.ids.length()
    }

    pub fn max_id_attempts(&self) -> u32 {
        self.ids.max_attempts()
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// Identifier generator configured with this length and attempt bound.
    pub fn id_service(&self) -> IdService {
        self.ids
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ids: IdService::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the identifier attempt bound from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of 32.
pub fn max_id_attempts_from_env_value(value: Option<String>) -> ClinicResult<u32> {
    match non_blank(value) {
        None => Ok(DEFAULT_MAX_ID_ATTEMPTS),
        Some(v) => match v.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ClinicError::InvalidInput(format!(
                "max id attempts must be a positive integer, got '{v}'"
            ))),
        },
    }
}

/// Parse the default page size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of 10.
pub fn page_size_from_env_value(value: Option<String>) -> ClinicResult<usize> {
    match non_blank(value) {
        None => Ok(DEFAULT_PAGE_SIZE),
        Some(v) => match v.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ClinicError::InvalidInput(format!(
                "page size must be a positive integer, got '{v}'"
            ))),
        },
    }
}

/// Build a config from the optional env values the runner reads at startup.
pub fn core_config_from_env_values(
    max_id_attempts: Option<String>,
    default_page_size: Option<String>,
) -> ClinicResult<CoreConfig> {
    CoreConfig::new(
        DEFAULT_ID_LENGTH,
        max_id_attempts_from_env_value(max_id_attempts)?,
        page_size_from_env_value(default_page_size)?,
        MAX_PAGE_SIZE,
    )
}
