//! Uniform JSON response wrapper.
//!
//! Every REST response body is a [`ResponseEnvelope`]. Fields that do not apply to a given
//! response are omitted rather than serialised as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Pagination totals attached to listing responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMeta {
    pub current_page_no: usize,
    pub total_no_of_records: usize,
    pub total_no_of_pages: usize,
    pub records_per_page: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResponseEnvelope {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page_no: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_no_of_records: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_no_of_pages: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_per_page: Option<usize>,
    pub time_stamp: DateTime<Utc>,
}

impl ResponseEnvelope {
    fn base(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
            error: None,
            current_page_no: None,
            total_no_of_records: None,
            total_no_of_pages: None,
            records_per_page: None,
            time_stamp: Utc::now(),
        }
    }

    /// Success without a payload, e.g. after a delete.
    pub fn success(message: impl Into<String>) -> Self {
        Self::base(ResponseStatus::Success, message)
    }

    /// Success carrying `data`.
    ///
    /// # Errors
    ///
    /// Fails if `data` cannot be represented as JSON.
    pub fn with_data<T: Serialize>(
        message: impl Into<String>,
        data: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            data: Some(serde_json::to_value(data)?),
            ..Self::base(ResponseStatus::Success, message)
        })
    }

    /// Success carrying one page of a listing.
    pub fn paged<T: Serialize>(
        message: impl Into<String>,
        items: &[T],
        meta: PageMeta,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            current_page_no: Some(meta.current_page_no),
            total_no_of_records: Some(meta.total_no_of_records),
            total_no_of_pages: Some(meta.total_no_of_pages),
            records_per_page: Some(meta.records_per_page),
            ..Self::with_data(message, &items)?
        })
    }

    /// Failure. `message` is the specific reason and `error` the short category label.
    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::base(ResponseStatus::Error, message)
        }
    }
}
