//! User account operations.

use crate::config::CoreConfig;
use crate::error::{ClinicError, ClinicResult};
use crate::policy::UserPolicy;
use crate::repositories::{Page, PageRequest, UserCriteria, UserRepository};
use crate::role::Actor;
use crate::user::{NewUser, User, UserUpdate};
use crate::validation::{validate_experience, validate_new_user, validate_user_update};
use chrono::Utc;
use clinic_ids::ShortId;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
    cfg: Arc<CoreConfig>,
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(cfg: Arc<CoreConfig>, users: Arc<dyn UserRepository>) -> Self {
        Self { cfg, users }
    }

    /// Resolves the caller of a request into an [`Actor`].
    pub fn resolve_actor(&self, id: &str) -> ClinicResult<Actor> {
        self.users
            .find(id)
            .map(|user| user.actor())
            .ok_or_else(|| ClinicError::user_not_found(id))
    }

    /// Public registration. `actor` is `None` for an anonymous caller.
    pub fn register(&self, actor: Option<&Actor>, input: NewUser) -> ClinicResult<User> {
        UserPolicy::authorize_registration(actor, input.role)?;
        let user = self.provision(input, None)?;
        tracing::info!(
            user = %user.id,
            role = %user.role,
            registered_by = actor.map(|a| a.id().to_string()).as_deref().unwrap_or("anonymous"),
            "user registered"
        );
        Ok(user)
    }

    /// Validates and stores a user without a permission check.
    ///
    /// Used for seeding and by [`register`](Self::register) once the caller is approved.
    /// A fresh id is generated unless `id` is given.
    pub fn provision(&self, input: NewUser, id: Option<ShortId>) -> ClinicResult<User> {
        let now = Utc::now();
        let fields = validate_new_user(&input, now.date_naive())?;

        let id = match id {
            Some(id) => id,
            None => self
                .cfg
                .id_service()
                .generate_unique(|candidate| self.users.exists(candidate))?,
        };

        let user = User {
            id,
            user_name: fields.user_name,
            real_name: fields.real_name,
            email: fields.email,
            phone_no: fields.phone_no,
            role: input.role,
            gender: input.gender,
            department: input.department,
            date_of_birth: input.date_of_birth,
            address: fields.address,
            experience: input.experience,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.clone())?;
        Ok(user)
    }

    pub fn list(
        &self,
        actor: &Actor,
        criteria: &UserCriteria,
        page: PageRequest,
    ) -> ClinicResult<Page<User>> {
        UserPolicy::authorize_directory_listing(actor)?;
        Ok(self.users.search(criteria, page))
    }

    pub fn get(&self, actor: &Actor, id: &str) -> ClinicResult<User> {
        let user = self
            .users
            .find(id)
            .ok_or_else(|| ClinicError::user_not_found(id))?;
        UserPolicy::authorize_view(actor, id)?;
        Ok(user)
    }

    /// Applies a partial update. Only the fields present in `update` change.
    pub fn update(&self, actor: &Actor, id: &str, update: UserUpdate) -> ClinicResult<User> {
        if !self.users.exists(id) {
            return Err(ClinicError::user_not_found(id));
        }
        UserPolicy::authorize_update(actor, id)?;

        if update.is_empty() {
            return Err(ClinicError::InvalidInput(
                "At least one field must be provided for update.".into(),
            ));
        }

        let now = Utc::now();
        let valid = validate_user_update(&update, now.date_naive())?;

        let updated = self.users.update_with(id, &mut |mut user| {
            if let Some(v) = valid.user_name.clone() {
                user.user_name = v;
            }
            if let Some(v) = valid.real_name.clone() {
                user.real_name = v;
            }
            if let Some(v) = valid.email.clone() {
                user.email = v;
            }
            if let Some(v) = valid.phone_no.clone() {
                user.phone_no = v;
            }
            if let Some(v) = valid.address.clone() {
                user.address = Some(v);
            }
            if update.experience.is_some() {
                validate_experience(user.role).map_err(|msg| {
                    ClinicError::InvalidInput(format!(
                        "Validation failed for fields: experience: {msg}"
                    ))
                })?;
                user.experience = update.experience;
            }
            if update.gender.is_some() {
                user.gender = update.gender;
            }
            if update.department.is_some() {
                user.department = update.department;
            }
            if update.date_of_birth.is_some() {
                user.date_of_birth = update.date_of_birth;
            }
            user.updated_at = now;
            Ok(user)
        })?;

        tracing::info!(user = id, actor = %actor.id(), "user updated");
        Ok(updated)
    }

    /// Removes a user account. Appointments that reference the user are left in place.
    pub fn delete(&self, actor: &Actor, id: &str) -> ClinicResult<()> {
        if !self.users.exists(id) {
            return Err(ClinicError::user_not_found(id));
        }
        UserPolicy::authorize_delete(actor, id)?;
        self.users.delete(id)?;
        tracing::info!(user = id, actor = %actor.id(), "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;
    use crate::repositories::InMemoryUsers;
    use crate::role::Role;
    use crate::user::Gender;

    fn service() -> UserService {
        UserService::new(
            Arc::new(CoreConfig::default()),
            Arc::new(InMemoryUsers::new()),
        )
    }

    fn input(name: &str, phone: &str, role: Role) -> NewUser {
        NewUser {
            user_name: name.into(),
            real_name: "Jo Bloggs".into(),
            email: format!("{name}@clinic.test"),
            phone_no: phone.into(),
            role,
            gender: None,
            department: None,
            date_of_birth: None,
            address: None,
            experience: None,
        }
    }

    #[test]
    fn anonymous_patient_registration() {
        let svc = service();
        let user = svc
            .register(None, input("newpatient", "5550000001", Role::Patient))
            .unwrap();
        assert_eq!(user.id.as_str().len(), 16);
        assert_eq!(user.role, Role::Patient);
        assert_eq!(svc.resolve_actor(user.id.as_str()).unwrap(), user.actor());
    }

    #[test]
    fn doctor_registration_needs_admin() {
        let svc = service();
        let err = svc
            .register(None, input("drnobody", "5550000002", Role::Doctor))
            .unwrap_err();
        assert!(matches!(err.as_policy(), Some(PolicyError::Unauthorized(_))));

        let admin = svc
            .provision(input("theadmin", "5550000003", Role::Admin), None)
            .unwrap()
            .actor();
        assert!(svc
            .register(Some(&admin), input("drsomebody", "5550000004", Role::Doctor))
            .is_ok());
    }

    #[test]
    fn duplicate_registration_is_already_exists() {
        let svc = service();
        svc.register(None, input("patient1", "5550000005", Role::Patient))
            .unwrap();
        let err = svc
            .register(None, input("patient1", "5550000006", Role::Patient))
            .unwrap_err();
        assert!(matches!(err, ClinicError::AlreadyExists(_)));
    }

    #[test]
    fn invalid_registration_lists_fields() {
        let svc = service();
        let err = svc
            .register(None, input("bad", "12", Role::Patient))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("user_name"));
        assert!(msg.contains("phone_no"));
    }

    #[test]
    fn self_update_changes_only_given_fields() {
        let svc = service();
        let user = svc
            .register(None, input("patient1", "5550000007", Role::Patient))
            .unwrap();
        let actor = user.actor();

        let updated = svc
            .update(
                &actor,
                user.id.as_str(),
                UserUpdate {
                    real_name: Some("Joanna Bloggs".into()),
                    ..UserUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.real_name.as_str(), "Joanna Bloggs");
        assert_eq!(updated.phone_no, "5550000007");
        assert_eq!(updated.created_at, user.created_at);
    }

    #[test]
    fn update_rules() {
        let svc = service();
        let p1 = svc
            .register(None, input("patient1", "5550000008", Role::Patient))
            .unwrap();
        let p2 = svc
            .register(None, input("patient2", "5550000009", Role::Patient))
            .unwrap();

        let err = svc
            .update(
                &p2.actor(),
                p1.id.as_str(),
                UserUpdate {
                    real_name: Some("Someone Else".into()),
                    ..UserUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err.as_policy(), Some(PolicyError::Unauthorized(_))));

        let err = svc
            .update(&p1.actor(), p1.id.as_str(), UserUpdate::default())
            .unwrap_err();
        assert!(matches!(err, ClinicError::InvalidInput(_)));

        let err = svc
            .update(
                &p1.actor(),
                p1.id.as_str(),
                UserUpdate {
                    user_name: Some("patient2".into()),
                    email: Some("patient2@clinic.test".into()),
                    ..UserUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The following fields already exist in the database: Username, Email"
        );
    }

    #[test]
    fn listing_and_viewing() {
        let svc = service();
        let cfg = CoreConfig::default();
        let recept = svc
            .provision(input("recept1", "5550000010", Role::Receptionist), None)
            .unwrap()
            .actor();
        let patient = svc
            .register(None, input("patient1", "5550000011", Role::Patient))
            .unwrap();

        let page = svc
            .list(&recept, &UserCriteria::default(), PageRequest::first(&cfg))
            .unwrap();
        assert_eq!(page.total_items, 2);
        assert!(svc
            .list(&patient.actor(), &UserCriteria::default(), PageRequest::first(&cfg))
            .is_err());

        assert!(svc.get(&recept, patient.id.as_str()).is_ok());
        assert!(svc.get(&patient.actor(), recept.id().as_str()).is_err());
        assert!(matches!(
            svc.get(&recept, "missing").unwrap_err().as_policy(),
            Some(PolicyError::NotFound(_))
        ));
    }

    #[test]
    fn users_delete_themselves() {
        let svc = service();
        let user = svc
            .register(None, input("patient1", "5550000012", Role::Patient))
            .unwrap();
        svc.delete(&user.actor(), user.id.as_str()).unwrap();
        assert!(svc.resolve_actor(user.id.as_str()).is_err());
    }

    #[test]
    fn profile_fields_are_stored_and_updated() {
        let svc = service();
        let mut doctor = input("drgrey", "5550000014", Role::Doctor);
        doctor.gender = Some(Gender::Female);
        doctor.address = Some("4 Elm Road, York".into());
        doctor.experience = Some(7);
        let doctor = svc.provision(doctor, None).unwrap();
        assert_eq!(doctor.gender, Some(Gender::Female));
        assert_eq!(doctor.address.as_deref(), Some("4 Elm Road, York"));
        assert_eq!(doctor.experience, Some(7));

        let updated = svc
            .update(
                &doctor.actor(),
                doctor.id.as_str(),
                UserUpdate {
                    experience: Some(8),
                    address: Some("9 Oak Road, York".into()),
                    ..UserUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.experience, Some(8));
        assert_eq!(updated.address.as_deref(), Some("9 Oak Road, York"));
        assert_eq!(updated.gender, Some(Gender::Female));
    }

    #[test]
    fn patients_cannot_record_experience() {
        let svc = service();
        let patient = svc
            .register(None, input("patient1", "5550000015", Role::Patient))
            .unwrap();
        let err = svc
            .update(
                &patient.actor(),
                patient.id.as_str(),
                UserUpdate {
                    experience: Some(2),
                    ..UserUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed for fields: experience: only applies to doctors"
        );
        assert_eq!(svc.get(&patient.actor(), patient.id.as_str()).unwrap().experience, None);
    }

    #[test]
    fn provision_keeps_given_id() {
        let svc = service();
        let id = ShortId::parse("dr-grey").unwrap();
        let user = svc
            .provision(input("drgrey", "5550000013", Role::Doctor), Some(id.clone()))
            .unwrap();
        assert_eq!(user.id, id);
    }
}
