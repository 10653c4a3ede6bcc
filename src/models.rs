use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::attendance::punch::GeoLocation;

/// Body shared by the web, mobile and admin punch endpoints.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PunchRequest {
    #[schema(example = "Mozilla/5.0 (X11; Linux x86_64)")]
    pub device_info: Option<String>,
    /// Required for mobile punches.
    #[schema(example = 23.8103)]
    pub latitude: Option<f64>,
    #[schema(example = 90.4125)]
    pub longitude: Option<f64>,
}

impl PunchRequest {
    /// Both coordinates or nothing.
    pub fn location(&self) -> Option<GeoLocation> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoLocation {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BiometricPushRequest {
    #[schema(example = "ZK-0042")]
    pub device_id: String,
    /// Device clock reading. UTC when the company has biometric UTC
    /// conversion enabled, otherwise the employee's wall time.
    #[schema(example = "2026-01-05T03:35:00", format = "date-time", value_type = String)]
    pub punch_time: NaiveDateTime,
    pub device_info: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessLogsRequest {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub from: NaiveDate,
    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub to: NaiveDate,
    /// Limit the run to one employee.
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
}
