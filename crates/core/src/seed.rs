//! YAML seed data loaded at startup.
//!
//! ```yaml
//! users:
//!   - id: dr-grey            # optional; generated when absent
//!     user_name: drgrey
//!     real_name: Meredith Grey
//!     email: grey@clinic.test
//!     phone_no: "0123456789"
//!     role: DOCTOR
//!     department: GENERAL_MEDICINE
//! ```

use crate::error::{ClinicError, ClinicResult};
use crate::services::UserService;
use crate::user::NewUser;
use clinic_ids::ShortId;
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SeedUser {
    #[serde(default)]
    pub id: Option<ShortId>,
    #[serde(flatten)]
    pub user: NewUser,
}

impl SeedFile {
    pub fn parse(yaml: &str) -> ClinicResult<Self> {
        serde_yaml::from_str(yaml).map_err(ClinicError::SeedParse)
    }
}

pub fn load_seed(path: &Path) -> ClinicResult<SeedFile> {
    let text = std::fs::read_to_string(path).map_err(ClinicError::SeedRead)?;
    SeedFile::parse(&text)
}

/// Stores every seeded user, stopping at the first one that fails validation or clashes.
///
/// Returns the number of users stored.
pub fn apply_seed(users: &UserService, seed: SeedFile) -> ClinicResult<usize> {
    let mut stored = 0;
    for entry in seed.users {
        let name = entry.user.user_name.clone();
        users.provision(entry.user, entry.id).map_err(|e| match e {
            ClinicError::InvalidInput(msg) => {
                ClinicError::InvalidInput(format!("seed user '{name}': {msg}"))
            }
            other => other,
        })?;
        stored += 1;
    }
    tracing::info!(count = stored, "seed users loaded");
    Ok(stored)
}
