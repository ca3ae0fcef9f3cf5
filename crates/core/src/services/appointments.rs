//! Appointment operations.
//!
//! Each operation resolves the records a decision needs, asks [`AppointmentPolicy`], and
//! persists the approved result. Status changes run inside the repository's atomic
//! `update_with`, so the policy always sees the stored status.

use crate::appointment::{Appointment, AppointmentStatus, BookingRequest};
use crate::config::CoreConfig;
use crate::error::{ClinicError, ClinicResult};
use crate::policy::AppointmentPolicy;
use crate::repositories::{
    AppointmentCriteria, AppointmentRepository, Page, PageRequest, UserRepository,
};
use crate::role::Actor;
use chrono::Utc;
use clinic_ids::ShortId;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppointmentService {
    cfg: Arc<CoreConfig>,
    appointments: Arc<dyn AppointmentRepository>,
    users: Arc<dyn UserRepository>,
}

impl AppointmentService {
    pub fn new(
        cfg: Arc<CoreConfig>,
        appointments: Arc<dyn AppointmentRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            cfg,
            appointments,
            users,
        }
    }

    /// Unscoped search with optional filters. Admin and receptionist only.
    pub fn list_all(
        &self,
        actor: &Actor,
        criteria: &AppointmentCriteria,
        page: PageRequest,
    ) -> ClinicResult<Page<Appointment>> {
        AppointmentPolicy::authorize_full_listing(actor).inspect_err(|e| {
            tracing::warn!(actor = %actor.id(), "appointment search declined: {e}");
        })?;
        Ok(self.appointments.search(criteria, page))
    }

    /// Books an appointment.
    ///
    /// The self-booking rule is checked before either user is looked up. The doctor and
    /// patient must exist (`NotFound`) and hold the right roles (`InvalidRole`).
    pub fn create(&self, actor: &Actor, request: BookingRequest) -> ClinicResult<Appointment> {
        AppointmentPolicy::ensure_may_book_for(actor, request.patient_id.as_str())?;

        let doctor = self
            .users
            .find(request.doctor_id.as_str())
            .ok_or_else(|| ClinicError::user_not_found(request.doctor_id.as_str()))?;
        let patient = self
            .users
            .find(request.patient_id.as_str())
            .ok_or_else(|| ClinicError::user_not_found(request.patient_id.as_str()))?;

        let draft = AppointmentPolicy::authorize_creation(
            actor,
            &doctor.actor(),
            &patient.actor(),
            request.scheduled_date,
            request.slot,
            Utc::now(),
        )?;

        let id = self
            .cfg
            .id_service()
            .generate_unique(|candidate| self.appointments.exists(candidate))
            .inspect_err(|e| tracing::error!("appointment id allocation failed: {e}"))?;
        let appointment = draft.assign_id(id);

        self.appointments.insert(appointment.clone())?;

        tracing::info!(
            appointment = %appointment.id,
            doctor = %appointment.doctor_id,
            patient = %appointment.patient_id,
            booked_by = %actor.id(),
            "appointment booked"
        );
        Ok(appointment)
    }

    /// Appointments of one user, as the policy engine scopes them.
    pub fn list_for_user(
        &self,
        actor: &Actor,
        user_id: &ShortId,
        page: PageRequest,
    ) -> ClinicResult<Page<Appointment>> {
        if !self.users.exists(user_id.as_str()) {
            return Err(ClinicError::user_not_found(user_id.as_str()));
        }

        let scope = AppointmentPolicy::authorize_scoped_listing(actor, user_id)?;
        Ok(self
            .appointments
            .search(&AppointmentCriteria::for_scope(scope), page))
    }

    pub fn get(&self, actor: &Actor, id: &str) -> ClinicResult<Appointment> {
        let appointment = self
            .appointments
            .find(id)
            .ok_or_else(|| ClinicError::appointment_not_found(id))?;
        AppointmentPolicy::authorize_view(actor, &appointment)?;
        Ok(appointment)
    }

    /// Moves an appointment to `requested`, atomically against the stored status.
    pub fn update_status(
        &self,
        actor: &Actor,
        id: &str,
        requested: AppointmentStatus,
    ) -> ClinicResult<Appointment> {
        let now = Utc::now();
        let mut previous = None;

        let updated = self
            .appointments
            .update_with(id, &mut |current| {
                previous = Some(current.status);
                AppointmentPolicy::authorize_transition(actor, current, requested, now)
                    .map_err(ClinicError::from)
            })
            .inspect_err(|e| {
                if e.as_policy().is_some() {
                    tracing::warn!(appointment = id, actor = %actor.id(), "status change declined: {e}");
                }
            })?;

        tracing::info!(
            appointment = id,
            actor = %actor.id(),
            from = ?previous,
            to = %updated.status,
            "appointment status changed"
        );
        Ok(updated)
    }

    /// Removes an appointment. The permission check runs before the existence check.
    pub fn delete(&self, actor: &Actor, id: &str) -> ClinicResult<()> {
        AppointmentPolicy::authorize_delete(actor)?;
        self.appointments.delete(id)?;
        tracing::info!(appointment = id, actor = %actor.id(), "appointment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::TimeSlot;
    use crate::error::PolicyError;
    use crate::repositories::{InMemoryAppointments, InMemoryUsers};
    use crate::role::Role;
    use crate::services::UserService;
    use crate::user::NewUser;
    use chrono::NaiveDate;

    struct Clinic {
        cfg: Arc<CoreConfig>,
        appointments: AppointmentService,
        admin: Actor,
        receptionist: Actor,
        doctor: Actor,
        other_doctor: Actor,
        patient: Actor,
        other_patient: Actor,
    }

    fn new_user(name: &str, phone: &str, role: Role) -> NewUser {
        NewUser {
            user_name: name.into(),
            real_name: "Test Person".into(),
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

    fn clinic() -> Clinic {
        let cfg = Arc::new(CoreConfig::default());
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUsers::new());
        let appointment_repo: Arc<dyn AppointmentRepository> = Arc::new(InMemoryAppointments::new());
        let user_service = UserService::new(cfg.clone(), users.clone());

        let add = |name: &str, phone: &str, role: Role| {
            user_service
                .provision(new_user(name, phone, role), None)
                .unwrap()
                .actor()
        };

        Clinic {
            admin: add("admin1", "1000000001", Role::Admin),
            receptionist: add("recept1", "1000000002", Role::Receptionist),
            doctor: add("doctor1", "1000000003", Role::Doctor),
            other_doctor: add("doctor2", "1000000004", Role::Doctor),
            patient: add("patient1", "1000000005", Role::Patient),
            other_patient: add("patient2", "1000000006", Role::Patient),
            appointments: AppointmentService::new(cfg.clone(), appointment_repo, users),
            cfg,
        }
    }

    fn booking(doctor: &Actor, patient: &Actor) -> BookingRequest {
        BookingRequest {
            doctor_id: doctor.id().clone(),
            patient_id: patient.id().clone(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            slot: TimeSlot::ThreePm,
        }
    }

    #[test]
    fn patient_self_booking_is_scheduled_with_fresh_id() {
        let c = clinic();
        let appt = c
            .appointments
            .create(&c.patient, booking(&c.doctor, &c.patient))
            .unwrap();

        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.id.as_str().len(), c.cfg.id_length());
        assert_eq!(&appt.doctor_id, c.doctor.id());
        assert_eq!(&appt.patient_id, c.patient.id());
        assert_eq!(c.appointments.get(&c.patient, appt.id.as_str()).unwrap(), appt);
    }

    #[test]
    fn patient_booking_for_missing_user_is_unauthorized_not_not_found() {
        let c = clinic();
        let request = BookingRequest {
            patient_id: ShortId::parse("ghost").unwrap(),
            ..booking(&c.doctor, &c.patient)
        };
        let err = c.appointments.create(&c.patient, request).unwrap_err();
        assert!(matches!(err.as_policy(), Some(PolicyError::Unauthorized(_))));
    }

    #[test]
    fn staff_booking_for_missing_doctor_is_not_found() {
        let c = clinic();
        let request = BookingRequest {
            doctor_id: ShortId::parse("ghost").unwrap(),
            ..booking(&c.doctor, &c.patient)
        };
        let err = c.appointments.create(&c.receptionist, request).unwrap_err();
        assert_eq!(err.to_string(), "User not found with ID: ghost");
    }

    #[test]
    fn booking_with_swapped_roles_is_invalid_role() {
        let c = clinic();
        let err = c
            .appointments
            .create(&c.admin, booking(&c.patient, &c.patient))
            .unwrap_err();
        assert!(matches!(
            err.as_policy(),
            Some(PolicyError::InvalidRole {
                expected: Role::Doctor,
                ..
            })
        ));
    }

    #[test]
    fn second_cancellation_is_illegal() {
        let c = clinic();
        let appt = c
            .appointments
            .create(&c.receptionist, booking(&c.doctor, &c.patient))
            .unwrap();

        let cancelled = c
            .appointments
            .update_status(&c.doctor, appt.id.as_str(), AppointmentStatus::Cancelled)
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert!(cancelled.status_updated_at >= appt.status_updated_at);

        let err = c
            .appointments
            .update_status(&c.patient, appt.id.as_str(), AppointmentStatus::Cancelled)
            .unwrap_err();
        assert!(matches!(
            err.as_policy(),
            Some(PolicyError::IllegalTransition { .. })
        ));

        let reopened = c
            .appointments
            .update_status(&c.admin, appt.id.as_str(), AppointmentStatus::Scheduled)
            .unwrap();
        assert_eq!(reopened.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn declined_transition_keeps_stored_status() {
        let c = clinic();
        let appt = c
            .appointments
            .create(&c.admin, booking(&c.doctor, &c.patient))
            .unwrap();

        assert!(c
            .appointments
            .update_status(&c.other_doctor, appt.id.as_str(), AppointmentStatus::Cancelled)
            .is_err());
        assert_eq!(
            c.appointments.get(&c.admin, appt.id.as_str()).unwrap().status,
            AppointmentStatus::Scheduled
        );
    }

    #[test]
    fn update_of_missing_appointment_is_not_found() {
        let c = clinic();
        let err = c
            .appointments
            .update_status(&c.admin, "missing", AppointmentStatus::Completed)
            .unwrap_err();
        assert!(matches!(err.as_policy(), Some(PolicyError::NotFound(_))));
    }

    #[test]
    fn scoped_listing_respects_identity_and_scope() {
        let c = clinic();
        c.appointments
            .create(&c.admin, booking(&c.doctor, &c.patient))
            .unwrap();
        c.appointments
            .create(&c.admin, booking(&c.doctor, &c.other_patient))
            .unwrap();
        let page = PageRequest::first(&c.cfg);

        let doctor_view = c
            .appointments
            .list_for_user(&c.doctor, c.doctor.id(), page)
            .unwrap();
        assert_eq!(doctor_view.total_items, 2);

        let patient_view = c
            .appointments
            .list_for_user(&c.patient, c.patient.id(), page)
            .unwrap();
        assert_eq!(patient_view.total_items, 1);

        // Staff always get the patient-side query.
        let reception_on_doctor = c
            .appointments
            .list_for_user(&c.receptionist, c.doctor.id(), page)
            .unwrap();
        assert_eq!(reception_on_doctor.total_items, 0);

        assert!(c
            .appointments
            .list_for_user(&c.patient, c.other_patient.id(), page)
            .is_err());

        let missing = ShortId::parse("nobody").unwrap();
        let err = c
            .appointments
            .list_for_user(&c.admin, &missing, page)
            .unwrap_err();
        assert!(matches!(err.as_policy(), Some(PolicyError::NotFound(_))));
    }

    #[test]
    fn full_listing_filters_by_status() {
        let c = clinic();
        let first = c
            .appointments
            .create(&c.admin, booking(&c.doctor, &c.patient))
            .unwrap();
        c.appointments
            .create(&c.admin, booking(&c.other_doctor, &c.patient))
            .unwrap();
        c.appointments
            .update_status(&c.admin, first.id.as_str(), AppointmentStatus::NoShow)
            .unwrap();

        let criteria = AppointmentCriteria {
            status: Some(AppointmentStatus::NoShow),
            ..AppointmentCriteria::default()
        };
        let page = c
            .appointments
            .list_all(&c.receptionist, &criteria, PageRequest::first(&c.cfg))
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].id, first.id);

        assert!(c
            .appointments
            .list_all(&c.doctor, &criteria, PageRequest::first(&c.cfg))
            .is_err());
    }

    #[test]
    fn delete_checks_permission_before_existence() {
        let c = clinic();
        let err = c.appointments.delete(&c.receptionist, "missing").unwrap_err();
        assert!(matches!(err.as_policy(), Some(PolicyError::Unauthorized(_))));

        let err = c.appointments.delete(&c.admin, "missing").unwrap_err();
        assert!(matches!(err.as_policy(), Some(PolicyError::NotFound(_))));

        let appt = c
            .appointments
            .create(&c.admin, booking(&c.doctor, &c.patient))
            .unwrap();
        c.appointments.delete(&c.admin, appt.id.as_str()).unwrap();
        assert!(c.appointments.get(&c.admin, appt.id.as_str()).is_err());
    }

    #[test]
    fn other_patient_cannot_view_appointment() {
        let c = clinic();
        let appt = c
            .appointments
            .create(&c.patient, booking(&c.doctor, &c.patient))
            .unwrap();
        assert!(c
            .appointments
            .get(&c.other_patient, appt.id.as_str())
            .is_err());
        assert!(c.appointments.get(&c.doctor, appt.id.as_str()).is_ok());
    }
}
