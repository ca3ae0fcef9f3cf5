//! User records.
//!
//! A user is anyone who can sign in: patients, doctors and clinic staff. The user record is
//! the source of the [`Actor`] passed into policy decisions.

use chrono::{DateTime, NaiveDate, Utc};
use clinic_ids::ShortId;
use clinic_types::{EmailAddress, NonEmptyText};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClinicError;
use crate::role::{Actor, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    GeneralMedicine,
    Cardiology,
    Dermatology,
    Neurology,
    Orthopaedics,
    Paediatrics,
    Radiology,
    FrontDesk,
}

impl Department {
    pub const ALL: [Department; 8] = [
        Department::GeneralMedicine,
        Department::Cardiology,
        Department::Dermatology,
        Department::Neurology,
        Department::Orthopaedics,
        Department::Paediatrics,
        Department::Radiology,
        Department::FrontDesk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::GeneralMedicine => "GENERAL_MEDICINE",
            Department::Cardiology => "CARDIOLOGY",
            Department::Dermatology => "DERMATOLOGY",
            Department::Neurology => "NEUROLOGY",
            Department::Orthopaedics => "ORTHOPAEDICS",
            Department::Paediatrics => "PAEDIATRICS",
            Department::Radiology => "RADIOLOGY",
            Department::FrontDesk => "FRONT_DESK",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ClinicError::InvalidInput(format!("unknown department: '{trimmed}'")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ClinicError::InvalidInput(format!("unknown gender: '{trimmed}'")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: ShortId,
    pub user_name: NonEmptyText,
    pub real_name: NonEmptyText,
    pub email: EmailAddress,
    pub phone_no: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Years in practice. Only doctors carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role)
    }
}

/// Unvalidated registration input.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub user_name: String,
    pub real_name: String,
    pub email: String,
    pub phone_no: String,
    pub role: Role,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub experience: Option<u32>,
}

/// Partial update; `None` leaves the field unchanged. Role cannot be changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub experience: Option<u32>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self == &UserUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_labels_match_serde() {
        for dept in Department::ALL {
            assert_eq!(
                serde_json::to_string(&dept).unwrap(),
                format!("\"{dept}\"")
            );
            assert_eq!(dept.as_str().to_lowercase().parse::<Department>().unwrap(), dept);
        }
    }

    #[test]
    fn gender_parses_any_case() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(serde_json::to_string(&Gender::Other).unwrap(), "\"OTHER\"");
        assert!(matches!(
            "unknown".parse::<Gender>(),
            Err(ClinicError::InvalidInput(_))
        ));
    }

    #[test]
    fn update_is_empty_until_a_field_is_set() {
        assert!(UserUpdate::default().is_empty());
        let update = UserUpdate {
            department: Some(Department::Cardiology),
            ..UserUpdate::default()
        };
        assert!(!update.is_empty());

        let update = UserUpdate {
            experience: Some(3),
            ..UserUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn new_user_deserializes_without_optional_fields() {
        let input: NewUser = serde_json::from_str(
            r#"{"user_name":"asha_k","real_name":"Asha","email":"a@b.co","phone_no":"0123456789","role":"PATIENT"}"#,
        )
        .unwrap();
        assert_eq!(input.role, Role::Patient);
        assert!(input.department.is_none());
        assert!(input.date_of_birth.is_none());
        assert!(input.gender.is_none());
        assert!(input.address.is_none());
        assert!(input.experience.is_none());
    }
}
