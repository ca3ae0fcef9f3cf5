//! Access rules for user records.

use crate::error::{PolicyError, PolicyResult};
use crate::role::{Actor, Role};

/// User-record policy decisions.
pub struct UserPolicy;

impl UserPolicy {
    /// Browsing the user directory is restricted to front-desk staff.
    pub fn authorize_directory_listing(actor: &Actor) -> PolicyResult<()> {
        if actor.role().is_staff() {
            Ok(())
        } else {
            Err(PolicyError::Unauthorized(
                "You are not authorized to access this endpoint.".into(),
            ))
        }
    }

    pub fn authorize_view(actor: &Actor, target_id: &str) -> PolicyResult<()> {
        if actor.is(target_id) || actor.role().is_staff() {
            Ok(())
        } else {
            Err(PolicyError::Unauthorized(
                "You are not authorized to view this user.".into(),
            ))
        }
    }

    pub fn authorize_update(actor: &Actor, target_id: &str) -> PolicyResult<()> {
        if actor.is(target_id) || actor.role() == Role::Admin {
            Ok(())
        } else {
            Err(PolicyError::Unauthorized(
                "You are not authorized to update this user.".into(),
            ))
        }
    }

    pub fn authorize_delete(actor: &Actor, target_id: &str) -> PolicyResult<()> {
        if actor.is(target_id) || actor.role() == Role::Admin {
            Ok(())
        } else {
            Err(PolicyError::Unauthorized(
                "You are not authorized to delete this user.".into(),
            ))
        }
    }

    /// Anyone, signed in or not, may register a patient account. Staff and doctor
    /// accounts are provisioned by an admin.
    pub fn authorize_registration(actor: Option<&Actor>, requested: Role) -> PolicyResult<()> {
        match (requested, actor.map(Actor::role)) {
            (Role::Patient, _) => Ok(()),
            (_, Some(Role::Admin)) => Ok(()),
            (role, _) => Err(PolicyError::Unauthorized(format!(
                "Only administrators can register {role} accounts."
            ))),
        }
    }
}
