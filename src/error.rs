//! Failures surfaced by the attendance core.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Employee not found or inactive")]
    EmployeeNotFound,

    #[error("Location (latitude, longitude) is required for mobile punch")]
    LocationRequired,

    #[error("No shift assigned for {date}")]
    NoShiftAssigned { date: NaiveDate },

    #[error("Punch rejected: {reason}")]
    PunchRejected { reason: String },

    #[error("Duplicate punch detected within {window_minutes} minute(s)")]
    DuplicatePunch { window_minutes: i64 },

    #[error("Please clock in before starting a break")]
    ClockInRequired,

    #[error("Already clocked out for today")]
    AlreadyClockedOut,

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Break rule {rule_id} not found for the current shift")]
    BreakRuleNotFound { rule_id: u64 },

    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::EmployeeNotFound | AttendanceError::BreakRuleNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            AttendanceError::LocationRequired
            | AttendanceError::ClockInRequired
            | AttendanceError::InvalidTimezone(_)
            | AttendanceError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            AttendanceError::NoShiftAssigned { .. } | AttendanceError::PunchRejected { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AttendanceError::DuplicatePunch { .. } | AttendanceError::AlreadyClockedOut => {
                StatusCode::CONFLICT
            }
            AttendanceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::Database(e) => {
                tracing::error!(error = %e, "Attendance operation failed");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
