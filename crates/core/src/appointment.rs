//! Appointment records and their enumerations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clinic_ids::ShortId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClinicError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                ClinicError::InvalidInput(format!("unknown appointment status: '{trimmed}'"))
            })
    }
}

/// The bookable hour-long slots of a clinic day. There is no 13:00 slot (lunch).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "09:00")]
    NineAm,
    #[serde(rename = "10:00")]
    TenAm,
    #[serde(rename = "11:00")]
    ElevenAm,
    #[serde(rename = "12:00")]
    Noon,
    #[serde(rename = "14:00")]
    TwoPm,
    #[serde(rename = "15:00")]
    ThreePm,
    #[serde(rename = "16:00")]
    FourPm,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 7] = [
        TimeSlot::NineAm,
        TimeSlot::TenAm,
        TimeSlot::ElevenAm,
        TimeSlot::Noon,
        TimeSlot::TwoPm,
        TimeSlot::ThreePm,
        TimeSlot::FourPm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::NineAm => "09:00",
            TimeSlot::TenAm => "10:00",
            TimeSlot::ElevenAm => "11:00",
            TimeSlot::Noon => "12:00",
            TimeSlot::TwoPm => "14:00",
            TimeSlot::ThreePm => "15:00",
            TimeSlot::FourPm => "16:00",
        }
    }

    pub fn start_time(&self) -> NaiveTime {
        let hour = match self {
            TimeSlot::NineAm => 9,
            TimeSlot::TenAm => 10,
            TimeSlot::ElevenAm => 11,
            TimeSlot::Noon => 12,
            TimeSlot::TwoPm => 14,
            TimeSlot::ThreePm => 15,
            TimeSlot::FourPm => 16,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSlot {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str() == trimmed)
            .ok_or_else(|| ClinicError::InvalidInput(format!("unknown time slot: '{trimmed}'")))
    }
}

/// A scheduled encounter between one doctor and one patient.
///
/// `id` is assigned once at creation and never changes. `status` and `status_updated_at`
/// change together, and only through an approved transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: ShortId,
    pub doctor_id: ShortId,
    pub patient_id: ShortId,
    pub scheduled_date: NaiveDate,
    pub slot: TimeSlot,
    pub status: AppointmentStatus,
    pub booked_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

/// A request to book a slot.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BookingRequest {
    pub doctor_id: ShortId,
    pub patient_id: ShortId,
    pub scheduled_date: NaiveDate,
    pub slot: TimeSlot,
}

/// An approved booking that has not been given an identifier yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub doctor_id: ShortId,
    pub patient_id: ShortId,
    pub scheduled_date: NaiveDate,
    pub slot: TimeSlot,
    pub status: AppointmentStatus,
    pub booked_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

impl AppointmentDraft {
    pub fn assign_id(self, id: ShortId) -> Appointment {
        Appointment {
            id,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            scheduled_date: self.scheduled_date,
            slot: self.slot,
            status: self.status,
            booked_at: self.booked_at,
            status_updated_at: self.status_updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_wire_labels() {
        assert_eq!(
            "no_show".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::NoShow
        );
        assert!("LATE".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn status_serde_matches_display() {
        for status in AppointmentStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn slots_have_no_lunch_hour() {
        assert!(TimeSlot::ALL
            .iter()
            .all(|slot| slot.start_time() != NaiveTime::from_hms_opt(13, 0, 0).unwrap()));
        assert!("13:00".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn slot_serde_uses_clock_labels() {
        let slot: TimeSlot = serde_json::from_str("\"14:00\"").unwrap();
        assert_eq!(slot, TimeSlot::TwoPm);
        assert_eq!(slot.start_time(), NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    }
}
