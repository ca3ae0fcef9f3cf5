//! Appointment lifecycle and access-control rules.
//!
//! Who may book for whom, which status transitions are legal, and which role may perform
//! them. Every function here is pure: the caller loads records, passes them in together
//! with the current instant, and persists whatever comes back.
//!
//! ## Transition matrix
//!
//! Evaluated on the actor's role:
//!
//! | Role         | Identity requirement           | Legal transitions          |
//! |--------------|--------------------------------|----------------------------|
//! | Doctor       | assigned doctor of the booking | `SCHEDULED -> CANCELLED`   |
//! | Patient      | patient of the booking         | `SCHEDULED -> CANCELLED`   |
//! | Receptionist | none                           | `SCHEDULED -> any`         |
//! | Admin        | none                           | any -> any                 |
//!
//! An identity mismatch is [`PolicyError::Unauthorized`]; the right person asking for the
//! wrong transition is [`PolicyError::IllegalTransition`].

use chrono::{DateTime, NaiveDate, Utc};
use clinic_ids::ShortId;

use crate::appointment::{Appointment, AppointmentDraft, AppointmentStatus, TimeSlot};
use crate::error::{PolicyError, PolicyResult};
use crate::role::{Actor, Role};

/// Which storage predicate a scoped listing should run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListingScope {
    /// Appointments whose doctor is the given user.
    ByDoctor(ShortId),
    /// Appointments whose patient is the given user.
    ByPatient(ShortId),
}

/// Appointment policy decisions.
///
/// Zero-sized; all rules are associated functions.
pub struct AppointmentPolicy;

impl AppointmentPolicy {
    /// Patients may only book for themselves. Every other role may book for anyone.
    ///
    /// Callers run this before resolving the doctor and patient records, so a patient
    /// probing another user's id learns nothing about whether that user exists.
    pub fn ensure_may_book_for(actor: &Actor, patient_id: &str) -> PolicyResult<()> {
        match actor.role() {
            Role::Patient if !actor.is(patient_id) => Err(PolicyError::Unauthorized(
                "You cannot book an appointment for another user.".into(),
            )),
            Role::Patient | Role::Doctor | Role::Receptionist | Role::Admin => Ok(()),
        }
    }

    /// Approves a booking and prepares the record to persist.
    ///
    /// `doctor` and `patient` are the resolved user records for the requested ids; looking
    /// them up (and reporting missing ones) is the caller's job.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::Unauthorized`] if a patient books for someone else.
    /// - [`PolicyError::InvalidRole`] if `doctor` is not a doctor or `patient` is not a patient.
    pub fn authorize_creation(
        actor: &Actor,
        doctor: &Actor,
        patient: &Actor,
        scheduled_date: NaiveDate,
        slot: TimeSlot,
        now: DateTime<Utc>,
    ) -> PolicyResult<AppointmentDraft> {
        Self::ensure_may_book_for(actor, patient.id().as_str())?;

        if doctor.role() != Role::Doctor {
            return Err(PolicyError::InvalidRole {
                id: doctor.id().to_string(),
                expected: Role::Doctor,
            });
        }
        if patient.role() != Role::Patient {
            return Err(PolicyError::InvalidRole {
                id: patient.id().to_string(),
                expected: Role::Patient,
            });
        }

        Ok(AppointmentDraft {
            doctor_id: doctor.id().clone(),
            patient_id: patient.id().clone(),
            scheduled_date,
            slot,
            status: AppointmentStatus::Scheduled,
            booked_at: now,
            status_updated_at: now,
        })
    }

    /// Approves a status change and applies it.
    ///
    /// `appointment` must be the currently persisted record; the check is made against its
    /// status, never against a status the client claims it had. On success the status and
    /// `status_updated_at` are updated and the record is handed back for persistence.
    pub fn authorize_transition(
        actor: &Actor,
        mut appointment: Appointment,
        requested: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> PolicyResult<Appointment> {
        let current = appointment.status;

        match actor.role() {
            Role::Doctor => {
                if !actor.is(appointment.doctor_id.as_str()) {
                    return Err(PolicyError::Unauthorized(
                        "You are not authorized to cancel appointments where you are not the assigned doctor.".into(),
                    ));
                }
                Self::ensure_cancellation(
                    current,
                    requested,
                    "You can only cancel your scheduled appointments.",
                )?;
            }
            Role::Patient => {
                if !actor.is(appointment.patient_id.as_str()) {
                    return Err(PolicyError::Unauthorized(
                        "You are not authorized to cancel someone else's appointment.".into(),
                    ));
                }
                Self::ensure_cancellation(
                    current,
                    requested,
                    "You can only cancel your own scheduled appointments.",
                )?;
            }
            Role::Receptionist => {
                if current != AppointmentStatus::Scheduled {
                    return Err(PolicyError::IllegalTransition {
                        from: current,
                        to: requested,
                        reason: "Receptionists can only update scheduled appointments.".into(),
                    });
                }
            }
            Role::Admin => {}
        }

        appointment.status = requested;
        appointment.status_updated_at = now;
        Ok(appointment)
    }

    /// Decides whether `actor` may list `target_user_id`'s appointments, and how.
    ///
    /// Allowed for the user themself and for front-desk staff. The selector follows the
    /// *caller's* role: a doctor gets the doctor-side query, everyone else the patient-side
    /// query, whatever role the target user holds. A receptionist looking up a doctor
    /// therefore sees that doctor's bookings as a patient, which is usually empty.
    pub fn authorize_scoped_listing(
        actor: &Actor,
        target_user_id: &ShortId,
    ) -> PolicyResult<ListingScope> {
        if !actor.is(target_user_id.as_str()) && !actor.role().is_staff() {
            return Err(PolicyError::Unauthorized(
                "You are not authorized to see appointments of this user.".into(),
            ));
        }

        Ok(match actor.role() {
            Role::Doctor => ListingScope::ByDoctor(target_user_id.clone()),
            Role::Patient | Role::Receptionist | Role::Admin => {
                ListingScope::ByPatient(target_user_id.clone())
            }
        })
    }

    /// Only admins delete appointments, in any status.
    pub fn authorize_delete(actor: &Actor) -> PolicyResult<()> {
        match actor.role() {
            Role::Admin => Ok(()),
            Role::Receptionist | Role::Doctor | Role::Patient => Err(PolicyError::Unauthorized(
                "You do not have permission to delete this appointment.".into(),
            )),
        }
    }

    /// The unfiltered appointment search is a front-desk tool.
    pub fn authorize_full_listing(actor: &Actor) -> PolicyResult<()> {
        if actor.role().is_staff() {
            Ok(())
        } else {
            Err(PolicyError::Unauthorized(
                "You are not authorized to access this endpoint.".into(),
            ))
        }
    }

    /// Staff can read any appointment; doctors and patients only their own.
    pub fn authorize_view(actor: &Actor, appointment: &Appointment) -> PolicyResult<()> {
        let allowed = match actor.role() {
            Role::Admin | Role::Receptionist => true,
            Role::Doctor => actor.is(appointment.doctor_id.as_str()),
            Role::Patient => actor.is(appointment.patient_id.as_str()),
        };
        if allowed {
            Ok(())
        } else {
            Err(PolicyError::Unauthorized(
                "You are not authorized to view this appointment.".into(),
            ))
        }
    }

    fn ensure_cancellation(
        current: AppointmentStatus,
        requested: AppointmentStatus,
        reason: &str,
    ) -> PolicyResult<()> {
        if current == AppointmentStatus::Scheduled && requested == AppointmentStatus::Cancelled {
            Ok(())
        } else {
            Err(PolicyError::IllegalTransition {
                from: current,
                to: requested,
                reason: reason.into(),
            })
        }
    }
}
