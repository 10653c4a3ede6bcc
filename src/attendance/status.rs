use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use super::AttendanceService;
use super::aggregator::find_regular_attendance;
use super::shift_timing::TimeOfDay;
use super::timezone::{is_within_time_of_day, now_in_timezone};
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::break_log::{BreakLog, BreakStatus};
use crate::model::daily_attendance::DailyAttendance;
use crate::model::punch::{Punch, PunchDirection};
use crate::model::shift::ResolvedShift;
use crate::store::ReadMode;

/// Read-only snapshot of an employee's day.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodayStatus {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub timezone: String,
    pub attendance: Option<DailyAttendance>,
    pub next_direction: PunchDirection,
    pub punches: Vec<Punch>,
    pub breaks: Vec<BreakLog>,
    pub on_break: bool,
    pub total_break_minutes: i64,
    pub shift: Option<ResolvedShift>,
    /// `None` when no shift resolves for today.
    pub within_shift_hours: Option<bool>,
}

impl AttendanceService {
    #[instrument(name = "today_status", skip(self))]
    pub async fn today_status(
        &self,
        employee_id: u64,
        company_id: u64,
    ) -> AttendanceResult<TodayStatus> {
        // read-only: dropped without commit
        let mut uow = self.store.begin().await?;

        let employee = uow
            .find_active_employee(employee_id, company_id)
            .await?
            .ok_or(AttendanceError::EmployeeNotFound)?;
        let tz = employee.timezone_or(&self.settings.default_timezone).to_string();
        let today = now_in_timezone(self.clock.as_ref(), &tz)?.date_naive();

        let attendance =
            find_regular_attendance(&mut *uow, employee.id, today, ReadMode::Snapshot).await?;
        let punches = uow.punches_on(employee.id, today).await?;
        let breaks = uow.breaks_on(employee.id, today).await?;
        let shift = self.shifts.resolve_shift(employee.id, today).await?;

        let within_shift_hours = match &shift {
            Some(resolved) => Some(is_within_time_of_day(
                self.clock.now(),
                TimeOfDay::from(resolved.shift.start_time),
                TimeOfDay::from(resolved.shift.end_time),
                &tz,
            )?),
            None => None,
        };

        Ok(TodayStatus {
            date: today,
            timezone: tz,
            next_direction: if attendance.is_some() {
                PunchDirection::Out
            } else {
                PunchDirection::In
            },
            attendance,
            punches,
            on_break: breaks.iter().any(|b| b.status == BreakStatus::Ongoing),
            total_break_minutes: breaks
                .iter()
                .filter_map(|b| b.break_duration_minutes)
                .sum(),
            breaks,
            shift,
            within_shift_hours,
        })
    }
}
