use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

/// Aggregated attendance for one employee on one calendar day.
///
/// Rows with a `workflow_master_id` come from the leave/on-duty/WFH
/// workflows; only rows where it is `None` are regular punch attendance.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DailyAttendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 7)]
    pub company_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub attendance_date: NaiveDate,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub punch_in: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub punch_out: Option<NaiveDateTime>,
    #[schema(example = 9.0)]
    pub total_hours: Option<f64>,
    #[schema(example = 9.0)]
    pub worked_hours: Option<f64>,
    pub attendance_status: AttendanceStatus,
    /// 1.0 is a full day.
    #[schema(example = 1.0)]
    pub pay_day: f64,
    pub workflow_master_id: Option<u64>,
}

impl DailyAttendance {
    pub fn is_regular(&self) -> bool {
        self.workflow_master_id.is_none()
    }

    /// Clocked in and not yet clocked out.
    pub fn is_open(&self) -> bool {
        self.punch_in.is_some() && self.punch_out.is_none()
    }
}

/// Insert shape for a new regular day record.
#[derive(Debug, Clone)]
pub struct NewDailyAttendance {
    pub employee_id: u64,
    pub company_id: u64,
    pub attendance_date: NaiveDate,
    pub punch_in: NaiveDateTime,
    pub punch_out: Option<NaiveDateTime>,
    pub total_hours: Option<f64>,
}

impl NewDailyAttendance {
    pub fn into_attendance(self, id: u64) -> DailyAttendance {
        DailyAttendance {
            id,
            employee_id: self.employee_id,
            company_id: self.company_id,
            attendance_date: self.attendance_date,
            punch_in: Some(self.punch_in),
            punch_out: self.punch_out,
            total_hours: self.total_hours,
            worked_hours: self.total_hours,
            attendance_status: AttendanceStatus::Present,
            pay_day: 1.0,
            workflow_master_id: None,
        }
    }
}
