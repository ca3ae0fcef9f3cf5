use crate::appointment::AppointmentStatus;
use crate::role::Role;

/// Reasons the policy engine declines an operation.
///
/// Every variant is terminal for the current operation; nothing here is retried.
/// Messages are written to be shown to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The actor's role or identity does not permit the operation.
    #[error("{0}")]
    Unauthorized(String),

    /// The actor may perform some transitions, but not `from -> to`.
    #[error("{reason} ({from} -> {to})")]
    IllegalTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
        reason: String,
    },

    /// A referenced user does not hold the role the operation needs.
    #[error("The user with ID {id} is not a valid {expected}.")]
    InvalidRole { id: String, expected: Role },

    /// A referenced appointment or user does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A role label outside the closed role set.
    #[error("unrecognised role: '{0}'")]
    UnresolvedRole(String),
}

pub type PolicyResult<T> = std::result::Result<T, PolicyError>;

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("failed to allocate identifier: {0}")]
    Identifier(#[from] clinic_ids::IdError),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("failed to read seed file: {0}")]
    SeedRead(std::io::Error),
    #[error("failed to parse seed file: {0}")]
    SeedParse(serde_yaml::Error),
}

impl ClinicError {
    pub fn user_not_found(id: &str) -> Self {
        PolicyError::NotFound(format!("User not found with ID: {id}")).into()
    }

    pub fn appointment_not_found(id: &str) -> Self {
        PolicyError::NotFound(format!("Appointment not found with ID: {id}")).into()
    }

    /// Returns the policy decision behind this error, if there is one.
    pub fn as_policy(&self) -> Option<&PolicyError> {
        match self {
            ClinicError::Policy(err) => Some(err),
            _ => None,
        }
    }
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
