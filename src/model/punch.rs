use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PunchSource {
    Web,
    Mobile,
    Biometric,
    Admin,
}

/// Direction of a punch, inferred from the day's regular attendance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PunchDirection {
    In,
    Out,
}

/// One row of the punch ledger. `punch_datetime` is wall-clock time in the
/// employee's zone and is never rewritten once stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Punch {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 7)]
    pub company_id: u64,
    #[schema(example = "2026-01-05T09:02:11", format = "date-time", value_type = String)]
    pub punch_datetime: NaiveDateTime,
    #[schema(example = "+06:00")]
    pub timezone_offset: String,
    pub punch_source: PunchSource,
    pub is_utc_converted: bool,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub original_utc_datetime: Option<NaiveDateTime>,
    pub biometric_device_id: Option<String>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_valid: bool,
    pub is_duplicate: bool,
    pub is_late: bool,
    pub is_early_out: bool,
    pub is_manual_entry: bool,
    pub daily_attendance_id: Option<u64>,
}

/// Insert shape for the punch ledger.
#[derive(Debug, Clone)]
pub struct NewPunch {
    pub employee_id: u64,
    pub company_id: u64,
    pub punch_datetime: NaiveDateTime,
    pub timezone_offset: String,
    pub punch_source: PunchSource,
    pub is_utc_converted: bool,
    pub original_utc_datetime: Option<NaiveDateTime>,
    pub biometric_device_id: Option<String>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_late: bool,
    pub is_early_out: bool,
    pub is_manual_entry: bool,
}

impl NewPunch {
    pub fn into_punch(self, id: u64) -> Punch {
        Punch {
            id,
            employee_id: self.employee_id,
            company_id: self.company_id,
            punch_datetime: self.punch_datetime,
            timezone_offset: self.timezone_offset,
            punch_source: self.punch_source,
            is_utc_converted: self.is_utc_converted,
            original_utc_datetime: self.original_utc_datetime,
            biometric_device_id: self.biometric_device_id,
            device_info: self.device_info,
            ip_address: self.ip_address,
            latitude: self.latitude,
            longitude: self.longitude,
            is_valid: true,
            is_duplicate: false,
            is_late: self.is_late,
            is_early_out: self.is_early_out,
            is_manual_entry: self.is_manual_entry,
            daily_attendance_id: None,
        }
    }
}
