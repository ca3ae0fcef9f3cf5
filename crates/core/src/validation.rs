//! Input validation for user records.
//!
//! Every field is checked and all failures are reported together, so a client fixing a form
//! sees the full list in one round trip.

use crate::error::{ClinicError, ClinicResult};
use crate::role::Role;
use crate::user::{NewUser, UserUpdate};
use chrono::NaiveDate;
use clinic_types::{EmailAddress, NonEmptyText};

const MIN_USER_NAME_LEN: usize = 5;
const PHONE_DIGITS: usize = 10;
const MIN_ADDRESS_LEN: usize = 5;

/// Registration input after every field has passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidUserFields {
    pub user_name: NonEmptyText,
    pub real_name: NonEmptyText,
    pub email: EmailAddress,
    pub phone_no: String,
    pub address: Option<String>,
}

/// Validated form of a partial update. `None` still means "leave unchanged".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidUserUpdate {
    pub user_name: Option<NonEmptyText>,
    pub real_name: Option<NonEmptyText>,
    pub email: Option<EmailAddress>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
}

#[derive(Default)]
struct FieldErrors(Vec<String>);

impl FieldErrors {
    fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(msg) => {
                self.0.push(format!("{field}: {msg}"));
                None
            }
        }
    }

    fn into_result(self) -> ClinicResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ClinicError::InvalidInput(format!(
                "Validation failed for fields: {}",
                self.0.join(", ")
            )))
        }
    }
}

/// Validates a user name: at least 5 characters from `[A-Za-z0-9!@#$%^&*()_+=]`.
pub fn validate_user_name(input: &str) -> Result<NonEmptyText, String> {
    if input.chars().count() < MIN_USER_NAME_LEN {
        return Err(format!(
            "must be at least {MIN_USER_NAME_LEN} characters long"
        ));
    }

    let ok = input.bytes().all(|b| {
        matches!(b,
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z'
            | b'!' | b'@' | b'#' | b'$' | b'%' | b'^' | b'&' | b'*'
            | b'(' | b')' | b'_' | b'+' | b'=')
    });
    if !ok {
        return Err("may only contain letters, digits and !@#$%^&*()_+=".into());
    }

    NonEmptyText::new(input).map_err(|e| e.to_string())
}

/// Validates a real name: letters and spaces, not blank.
pub fn validate_real_name(input: &str) -> Result<NonEmptyText, String> {
    if !input.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Err("may only contain letters and spaces".into());
    }
    NonEmptyText::new(input).map_err(|_| "must not be blank".to_string())
}

pub fn validate_email(input: &str) -> Result<EmailAddress, String> {
    EmailAddress::parse(input).map_err(|e| e.to_string())
}

/// Validates a phone number: exactly ten ASCII digits.
pub fn validate_phone_no(input: &str) -> Result<String, String> {
    if input.len() == PHONE_DIGITS && input.bytes().all(|b| b.is_ascii_digit()) {
        Ok(input.to_owned())
    } else {
        Err(format!("must be exactly {PHONE_DIGITS} digits"))
    }
}

/// Validates a postal address: at least 5 characters of letters, digits, spaces and commas,
/// with at least one letter. Surrounding whitespace is dropped.
pub fn validate_address(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.chars().count() < MIN_ADDRESS_LEN {
        return Err(format!(
            "must be at least {MIN_ADDRESS_LEN} characters long"
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || c == ',')
    {
        return Err("may only contain letters, digits, spaces and commas".into());
    }
    if !trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("must contain letters".into());
    }
    Ok(trimmed.to_owned())
}

/// Years of experience are recorded for doctors only.
pub fn validate_experience(role: Role) -> Result<(), String> {
    if role == Role::Doctor {
        Ok(())
    } else {
        Err("only applies to doctors".into())
    }
}

pub fn validate_date_of_birth(dob: NaiveDate, today: NaiveDate) -> Result<NaiveDate, String> {
    if dob < today {
        Ok(dob)
    } else {
        Err("must be in the past".into())
    }
}

/// Validates every field of a registration.
///
/// # Errors
///
/// Returns `ClinicError::InvalidInput` listing each failing field.
pub fn validate_new_user(input: &NewUser, today: NaiveDate) -> ClinicResult<ValidUserFields> {
    let mut errors = FieldErrors::default();

    let user_name = errors.check("user_name", validate_user_name(&input.user_name));
    let real_name = errors.check("real_name", validate_real_name(&input.real_name));
    let email = errors.check("email", validate_email(&input.email));
    let phone_no = errors.check("phone_no", validate_phone_no(&input.phone_no));
    if let Some(dob) = input.date_of_birth {
        errors.check("date_of_birth", validate_date_of_birth(dob, today));
    }
    let address = input
        .address
        .as_deref()
        .and_then(|v| errors.check("address", validate_address(v)));
    if input.experience.is_some() {
        errors.check("experience", validate_experience(input.role));
    }

    errors.into_result()?;

    match (user_name, real_name, email, phone_no) {
        (Some(user_name), Some(real_name), Some(email), Some(phone_no)) => Ok(ValidUserFields {
            user_name,
            real_name,
            email,
            phone_no,
            address,
        }),
        _ => Err(ClinicError::InvalidInput(
            "Validation failed for fields: unknown".into(),
        )),
    }
}

/// Validates the fields present in a partial update.
pub fn validate_user_update(update: &UserUpdate, today: NaiveDate) -> ClinicResult<ValidUserUpdate> {
    let mut errors = FieldErrors::default();

    let user_name = update
        .user_name
        .as_deref()
        .and_then(|v| errors.check("user_name", validate_user_name(v)));
    let real_name = update
        .real_name
        .as_deref()
        .and_then(|v| errors.check("real_name", validate_real_name(v)));
    let email = update
        .email
        .as_deref()
        .and_then(|v| errors.check("email", validate_email(v)));
    let phone_no = update
        .phone_no
        .as_deref()
        .and_then(|v| errors.check("phone_no", validate_phone_no(v)));
    if let Some(dob) = update.date_of_birth {
        errors.check("date_of_birth", validate_date_of_birth(dob, today));
    }
    let address = update
        .address
        .as_deref()
        .and_then(|v| errors.check("address", validate_address(v)));

    errors.into_result()?;

    Ok(ValidUserUpdate {
        user_name,
        real_name,
        email,
        phone_no,
        address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn new_user() -> NewUser {
        NewUser {
            user_name: "asha_k".into(),
            real_name: "Asha Kumar".into(),
            email: "asha@example.org".into(),
            phone_no: "0123456789".into(),
            role: Role::Patient,
            gender: None,
            department: None,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
            address: Some("  12 High Street, Leeds ".into()),
            experience: None,
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        let valid = validate_new_user(&new_user(), today()).expect("valid");
        assert_eq!(valid.user_name.as_str(), "asha_k");
        assert_eq!(valid.email.as_str(), "asha@example.org");
        assert_eq!(valid.address.as_deref(), Some("12 High Street, Leeds"));
    }

    #[test]
    fn address_rules() {
        assert!(validate_address("Flat 3, 9 Mill Lane").is_ok());
        assert!(validate_address("1 A").is_err());
        assert!(validate_address("12345 6789").is_err());
        assert!(validate_address("10 Downing St.").is_err());
    }

    #[test]
    fn experience_is_for_doctors() {
        let mut input = new_user();
        input.experience = Some(4);
        let err = validate_new_user(&input, today()).expect_err("patient with experience");
        assert!(err.to_string().contains("experience: only applies to doctors"));

        input.role = Role::Doctor;
        assert!(validate_new_user(&input, today()).is_ok());
    }

    #[test]
    fn user_name_rules() {
        assert!(validate_user_name("abcd").is_err());
        assert!(validate_user_name("ab cd e").is_err());
        assert!(validate_user_name("a-b-c-d").is_err());
        assert!(validate_user_name("Dr_Who!42").is_ok());
    }

    #[test]
    fn real_name_rules() {
        assert!(validate_real_name("Mary Jane").is_ok());
        assert!(validate_real_name("R2D2").is_err());
        assert!(validate_real_name("   ").is_err());
    }

    #[test]
    fn phone_must_be_ten_digits() {
        assert!(validate_phone_no("0123456789").is_ok());
        assert!(validate_phone_no("012345678").is_err());
        assert!(validate_phone_no("01234567890").is_err());
        assert!(validate_phone_no("01234-6789").is_err());
    }

    #[test]
    fn date_of_birth_must_be_past() {
        assert!(validate_date_of_birth(today(), today()).is_err());
        assert!(validate_date_of_birth(today().pred_opt().unwrap(), today()).is_ok());
    }

    #[test]
    fn reports_every_failing_field() {
        let mut input = new_user();
        input.user_name = "ab".into();
        input.phone_no = "123".into();
        input.email = "not-an-email".into();

        let err = validate_new_user(&input, today()).expect_err("three bad fields");
        let ClinicError::InvalidInput(msg) = err else {
            panic!("expected InvalidInput");
        };
        assert!(msg.starts_with("Validation failed for fields: "));
        assert!(msg.contains("user_name:"));
        assert!(msg.contains("email:"));
        assert!(msg.contains("phone_no:"));
        assert!(!msg.contains("real_name:"));
    }

    #[test]
    fn update_only_checks_present_fields() {
        let update = UserUpdate {
            phone_no: Some("9876543210".into()),
            ..UserUpdate::default()
        };
        let valid = validate_user_update(&update, today()).unwrap();
        assert_eq!(valid.phone_no.as_deref(), Some("9876543210"));
        assert!(valid.user_name.is_none());

        let bad = UserUpdate {
            real_name: Some("X Æ A-12".into()),
            ..UserUpdate::default()
        };
        assert!(matches!(
            validate_user_update(&bad, today()),
            Err(ClinicError::InvalidInput(_))
        ));
    }
}
