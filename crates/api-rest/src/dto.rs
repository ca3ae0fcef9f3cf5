//! Request bodies and query strings.
//!
//! Identifiers and enumerations arrive as plain strings and are parsed here, so a bad value
//! comes back as a 400 envelope instead of an extractor rejection.

use crate::error::ApiError;
use api_shared::PageMeta;
use chrono::NaiveDate;
use clinic_core::repositories::{AppointmentCriteria, Page, PageRequest, UserCriteria};
use clinic_core::{
    classify, AppointmentStatus, BookingRequest, CoreConfig, Department, Gender, NewUser,
    ShortId, TimeSlot, UserUpdate,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

pub(crate) fn parse_id(field: &str, value: &str) -> Result<ShortId, ApiError> {
    ShortId::parse(value).map_err(|e| ApiError::BadRequest(format!("{field}: {e}")))
}

fn parse_opt<T, E: std::fmt::Display>(
    value: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Result<Option<T>, ApiError> {
    value
        .map(|v| parse(v).map_err(|e| ApiError::BadRequest(e.to_string())))
        .transpose()
}

pub(crate) fn page_meta<T>(page: &Page<T>) -> PageMeta {
    PageMeta {
        current_page_no: page.page,
        total_no_of_records: page.total_items,
        total_no_of_pages: page.total_pages,
        records_per_page: page.size,
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page number.
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl PageQuery {
    pub fn request(&self, cfg: &CoreConfig) -> PageRequest {
        PageRequest::new(self.page, self.size, cfg)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentQuery {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    /// `SCHEDULED`, `CANCELLED`, `COMPLETED` or `NO_SHOW`.
    pub status: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    /// Clock label such as `09:00`.
    pub slot: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl AppointmentQuery {
    pub fn criteria(&self) -> Result<AppointmentCriteria, ApiError> {
        Ok(AppointmentCriteria {
            doctor_id: parse_opt(self.doctor_id.as_deref(), |v| parse_id("doctor_id", v))?,
            patient_id: parse_opt(self.patient_id.as_deref(), |v| parse_id("patient_id", v))?,
            status: parse_opt(self.status.as_deref(), str::parse::<AppointmentStatus>)?,
            scheduled_date: self.scheduled_date,
            slot: parse_opt(self.slot.as_deref(), str::parse::<TimeSlot>)?,
        })
    }

    pub fn request(&self, cfg: &CoreConfig) -> PageRequest {
        PageRequest::new(self.page, self.size, cfg)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub user_name: Option<String>,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    /// `MALE`, `FEMALE` or `OTHER`.
    pub gender: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl UserQuery {
    pub fn criteria(&self) -> Result<UserCriteria, ApiError> {
        Ok(UserCriteria {
            user_name: self.user_name.clone(),
            real_name: self.real_name.clone(),
            email: self.email.clone(),
            phone_no: self.phone_no.clone(),
            gender: parse_opt(self.gender.as_deref(), str::parse::<Gender>)?,
            role: parse_opt(self.role.as_deref(), classify)?,
            department: parse_opt(self.department.as_deref(), str::parse::<Department>)?,
            date_of_birth: self.date_of_birth,
        })
    }

    pub fn request(&self, cfg: &CoreConfig) -> PageRequest {
        PageRequest::new(self.page, self.size, cfg)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingBody {
    pub doctor_id: String,
    pub patient_id: String,
    pub scheduled_date: NaiveDate,
    /// Clock label such as `09:00`. There is no `13:00` slot.
    pub slot: String,
}

impl TryFrom<BookingBody> for BookingRequest {
    type Error = ApiError;

    fn try_from(body: BookingBody) -> Result<Self, Self::Error> {
        Ok(BookingRequest {
            doctor_id: parse_id("doctor_id", &body.doctor_id)?,
            patient_id: parse_id("patient_id", &body.patient_id)?,
            scheduled_date: body.scheduled_date,
            slot: body
                .slot
                .parse()
                .map_err(|e: clinic_core::ClinicError| ApiError::BadRequest(e.to_string()))?,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewUserBody {
    pub user_name: String,
    pub real_name: String,
    pub email: String,
    pub phone_no: String,
    /// `ADMIN`, `RECEPTIONIST`, `DOCTOR` or `PATIENT`.
    pub role: String,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    /// Years in practice, doctors only.
    pub experience: Option<u32>,
}

impl TryFrom<NewUserBody> for NewUser {
    type Error = ApiError;

    fn try_from(body: NewUserBody) -> Result<Self, Self::Error> {
        Ok(NewUser {
            role: classify(&body.role).map_err(|e| ApiError::BadRequest(e.to_string()))?,
            gender: parse_opt(body.gender.as_deref(), str::parse::<Gender>)?,
            department: parse_opt(body.department.as_deref(), str::parse::<Department>)?,
            user_name: body.user_name,
            real_name: body.real_name,
            email: body.email,
            phone_no: body.phone_no,
            date_of_birth: body.date_of_birth,
            address: body.address,
            experience: body.experience,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserUpdateBody {
    pub user_name: Option<String>,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub experience: Option<u32>,
}

impl TryFrom<UserUpdateBody> for UserUpdate {
    type Error = ApiError;

    fn try_from(body: UserUpdateBody) -> Result<Self, Self::Error> {
        Ok(UserUpdate {
            gender: parse_opt(body.gender.as_deref(), str::parse::<Gender>)?,
            department: parse_opt(body.department.as_deref(), str::parse::<Department>)?,
            user_name: body.user_name,
            real_name: body.real_name,
            email: body.email,
            phone_no: body.phone_no,
            date_of_birth: body.date_of_birth,
            address: body.address,
            experience: body.experience,
        })
    }
}
