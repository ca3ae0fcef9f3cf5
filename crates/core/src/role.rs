//! Identity and role resolution.
//!
//! Every caller is resolved to an [`Actor`]: an identifier plus exactly one [`Role`]. The role
//! set is closed, so dispatch on it is an exhaustive `match` everywhere in the crate.

use crate::error::{PolicyError, PolicyResult};
use clinic_ids::ShortId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Receptionist,
    Doctor,
    Patient,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Receptionist, Role::Doctor, Role::Patient];

    /// Wire label, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Receptionist => "RECEPTIONIST",
            Role::Doctor => "DOCTOR",
            Role::Patient => "PATIENT",
        }
    }

    /// Admins and receptionists run the front desk and see every record.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Receptionist)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Admin => "admin",
            Role::Receptionist => "receptionist",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        };
        f.write_str(label)
    }
}

impl FromStr for Role {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        classify(s)
    }
}

/// Classifies a stored role label into a [`Role`].
///
/// Matching ignores case and surrounding whitespace. Anything outside the four known labels
/// fails with [`PolicyError::UnresolvedRole`]; records written by this crate never hit that.
pub fn classify(label: &str) -> PolicyResult<Role> {
    let trimmed = label.trim();
    Role::ALL
        .into_iter()
        .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| PolicyError::UnresolvedRole(trimmed.to_owned()))
}

/// Identifier equality, used for every "is this my own record" check.
pub fn same_identity(a: &str, b: &str) -> bool {
    a == b
}

/// The authenticated caller of an operation.
///
/// Built once per request from the user record and passed explicitly into every policy
/// decision. There is no ambient "current user".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    id: ShortId,
    role: Role,
}

impl Actor {
    pub fn new(id: ShortId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn id(&self) -> &ShortId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// True if this actor is the user identified by `id`.
    pub fn is(&self, id: &str) -> bool {
        same_identity(self.id.as_str(), id)
    }
}
