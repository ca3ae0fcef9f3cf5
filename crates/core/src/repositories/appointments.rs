//! Appointment storage.

use crate::appointment::{Appointment, AppointmentStatus, TimeSlot};
use crate::error::{ClinicError, ClinicResult};
use crate::policy::ListingScope;
use crate::repositories::shared::{paginate, Page, PageRequest};
use chrono::NaiveDate;
use clinic_ids::ShortId;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Optional filters for an appointment search. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppointmentCriteria {
    pub doctor_id: Option<ShortId>,
    pub patient_id: Option<ShortId>,
    pub status: Option<AppointmentStatus>,
    pub scheduled_date: Option<NaiveDate>,
    pub slot: Option<TimeSlot>,
}

impl AppointmentCriteria {
    /// Criteria for a scoped listing decided by the policy engine.
    pub fn for_scope(scope: ListingScope) -> Self {
        match scope {
            ListingScope::ByDoctor(id) => Self {
                doctor_id: Some(id),
                ..Self::default()
            },
            ListingScope::ByPatient(id) => Self {
                patient_id: Some(id),
                ..Self::default()
            },
        }
    }

    pub fn matches(&self, appt: &Appointment) -> bool {
        self.doctor_id.as_ref().map_or(true, |d| *d == appt.doctor_id)
            && self.patient_id.as_ref().map_or(true, |p| *p == appt.patient_id)
            && self.status.map_or(true, |s| s == appt.status)
            && self.scheduled_date.map_or(true, |d| d == appt.scheduled_date)
            && self.slot.map_or(true, |s| s == appt.slot)
    }
}

/// Storage for appointments.
///
/// Implementations must make `insert` an authoritative uniqueness guard on the id and must
/// run the whole of `update_with` under exclusive access to the record.
pub trait AppointmentRepository: Send + Sync {
    fn exists(&self, id: &str) -> bool;

    /// Fails with `AlreadyExists` if the id is taken.
    fn insert(&self, appointment: Appointment) -> ClinicResult<()>;

    fn find(&self, id: &str) -> Option<Appointment>;

    /// Atomically loads the record, hands it to `change`, and stores what comes back.
    ///
    /// If `change` fails, the stored record is left untouched and the error is returned.
    fn update_with(
        &self,
        id: &str,
        change: &mut dyn FnMut(Appointment) -> ClinicResult<Appointment>,
    ) -> ClinicResult<Appointment>;

    fn delete(&self, id: &str) -> ClinicResult<()>;

    /// Matching appointments ordered by booking time, then id.
    fn search(&self, criteria: &AppointmentCriteria, page: PageRequest) -> Page<Appointment>;
}

#[derive(Debug, Default)]
pub struct InMemoryAppointments {
    rows: RwLock<BTreeMap<String, Appointment>>,
}

impl InMemoryAppointments {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AppointmentRepository for InMemoryAppointments {
    fn exists(&self, id: &str) -> bool {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    fn insert(&self, appointment: Appointment) -> ClinicResult<()> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let key = appointment.id.to_string();
        if rows.contains_key(&key) {
            return Err(ClinicError::AlreadyExists(format!(
                "Appointment already exists with ID: {key}"
            )));
        }
        rows.insert(key, appointment);
        Ok(())
    }

    fn find(&self, id: &str) -> Option<Appointment> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn update_with(
        &self,
        id: &str,
        change: &mut dyn FnMut(Appointment) -> ClinicResult<Appointment>,
    ) -> ClinicResult<Appointment> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let current = rows
            .get(id)
            .cloned()
            .ok_or_else(|| ClinicError::appointment_not_found(id))?;

        let updated = change(current)?;
        if updated.id.as_str() != id {
            return Err(ClinicError::InvalidInput(
                "appointment id cannot be changed".into(),
            ));
        }

        rows.insert(id.to_owned(), updated.clone());
        Ok(updated)
    }

    fn delete(&self, id: &str) -> ClinicResult<()> {
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ClinicError::appointment_not_found(id))
    }

    fn search(&self, criteria: &AppointmentCriteria, page: PageRequest) -> Page<Appointment> {
        let mut matched: Vec<Appointment> = self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|appt| criteria.matches(appt))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.booked_at
                .cmp(&b.booked_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        paginate(matched, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::error::PolicyError;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn id(s: &str) -> ShortId {
        ShortId::parse(s).unwrap()
    }

    fn appt(appt_id: &str, doctor: &str, patient: &str, minutes: i64) -> Appointment {
        let booked = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        Appointment {
            id: id(appt_id),
            doctor_id: id(doctor),
            patient_id: id(patient),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            slot: TimeSlot::ElevenAm,
            status: AppointmentStatus::Scheduled,
            booked_at: booked,
            status_updated_at: booked,
        }
    }

    #[test]
    fn insert_guards_uniqueness() {
        let repo = InMemoryAppointments::new();
        repo.insert(appt("a1", "d1", "p1", 0)).unwrap();
        assert!(repo.exists("a1"));
        assert!(matches!(
            repo.insert(appt("a1", "d2", "p2", 5)),
            Err(ClinicError::AlreadyExists(_))
        ));
        assert_eq!(repo.find("a1").unwrap().doctor_id, id("d1"));
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let repo = InMemoryAppointments::new();
        repo.insert(appt("a1", "d1", "p1", 0)).unwrap();

        let result = repo.update_with("a1", &mut |_| {
            Err(PolicyError::Unauthorized("no".into()).into())
        });
        assert!(result.is_err());
        assert_eq!(
            repo.find("a1").unwrap().status,
            AppointmentStatus::Scheduled
        );
    }

    #[test]
    fn update_rejects_missing_and_renamed_records() {
        let repo = InMemoryAppointments::new();
        assert!(matches!(
            repo.update_with("nope", &mut |a| Ok(a)),
            Err(ClinicError::Policy(PolicyError::NotFound(_)))
        ));

        repo.insert(appt("a1", "d1", "p1", 0)).unwrap();
        let result = repo.update_with("a1", &mut |mut a| {
            a.id = id("a2");
            Ok(a)
        });
        assert!(matches!(result, Err(ClinicError::InvalidInput(_))));
    }

    #[test]
    fn concurrent_cancellations_only_pass_once() {
        let repo = Arc::new(InMemoryAppointments::new());
        repo.insert(appt("a1", "d1", "p1", 0)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                std::thread::spawn(move || {
                    repo.update_with("a1", &mut |mut a| {
                        if a.status != AppointmentStatus::Scheduled {
                            return Err(ClinicError::InvalidInput("already settled".into()));
                        }
                        a.status = AppointmentStatus::Cancelled;
                        Ok(a)
                    })
                    .is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn search_filters_orders_and_pages() {
        let repo = InMemoryAppointments::new();
        repo.insert(appt("c", "d1", "p1", 20)).unwrap();
        repo.insert(appt("a", "d1", "p2", 10)).unwrap();
        repo.insert(appt("b", "d2", "p1", 0)).unwrap();
        repo.insert(appt("z", "d1", "p1", 10)).unwrap();

        let cfg = CoreConfig::default();
        let by_doctor = repo.search(
            &AppointmentCriteria::for_scope(ListingScope::ByDoctor(id("d1"))),
            PageRequest::first(&cfg),
        );
        let ids: Vec<_> = by_doctor.items.iter().map(|a| a.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "z", "c"]);

        let by_patient = repo.search(
            &AppointmentCriteria::for_scope(ListingScope::ByPatient(id("p1"))),
            PageRequest::new(Some(1), Some(2), &cfg),
        );
        assert_eq!(by_patient.total_items, 3);
        assert_eq!(by_patient.items.len(), 1);
        assert_eq!(by_patient.items[0].id, id("c"));
    }

    #[test]
    fn delete_reports_missing() {
        let repo = InMemoryAppointments::new();
        repo.insert(appt("a1", "d1", "p1", 0)).unwrap();
        repo.delete("a1").unwrap();
        assert!(!repo.exists("a1"));
        assert!(repo.delete("a1").is_err());
    }
}
