use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::AttendanceService;
use super::aggregator::{DayPunches, find_regular_attendance, upsert_daily_attendance};
use super::duplicate::is_duplicate;
use super::shift_timing::{TimeOfDay, TimingEvaluation, evaluate_punch};
use super::timezone::{
    format, local_naive_in_timezone, now_in_timezone, utc_naive_to_employee_timezone, utc_offset,
};
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::daily_attendance::DailyAttendance;
use crate::model::employee::Employee;
use crate::model::punch::{NewPunch, Punch, PunchDirection, PunchSource};
use crate::model::shift::ResolvedShift;
use crate::store::{ReadMode, UnitOfWork};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct GeoLocation {
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
}

/// An interactive punch (web, mobile, admin, or a terminal that reports
/// synchronously).
#[derive(Debug, Clone)]
pub struct PunchCommand {
    pub employee_id: u64,
    pub company_id: u64,
    pub source: PunchSource,
    /// Only read for biometric punches.
    pub device_time: Option<NaiveDateTime>,
    pub location: Option<GeoLocation>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BiometricPunch {
    pub company_id: u64,
    pub device_id: String,
    pub punch_time: NaiveDateTime,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PunchOutcome {
    pub direction: PunchDirection,
    pub punch: Punch,
    pub attendance: DailyAttendance,
    pub evaluation: TimingEvaluation,
    pub shift: ResolvedShift,
    #[schema(example = "2026-01-05 09:02:11")]
    pub local_time: String,
}

struct PunchInstant {
    local: DateTime<Tz>,
    is_utc_converted: bool,
    original_utc_datetime: Option<NaiveDateTime>,
}

impl AttendanceService {
    fn employee_timezone<'a>(&'a self, employee: &'a Employee) -> &'a str {
        employee.timezone_or(&self.settings.default_timezone)
    }

    async fn resolve_punch_instant(
        &self,
        uow: &mut dyn UnitOfWork,
        company_id: u64,
        tz: &str,
        source: PunchSource,
        device_time: Option<NaiveDateTime>,
    ) -> AttendanceResult<PunchInstant> {
        match (source, device_time) {
            (PunchSource::Biometric, Some(device_time)) => {
                if uow.is_biometric_utc_enabled(company_id).await? {
                    Ok(PunchInstant {
                        local: utc_naive_to_employee_timezone(device_time, tz)?,
                        is_utc_converted: true,
                        original_utc_datetime: Some(device_time),
                    })
                } else {
                    Ok(PunchInstant {
                        local: local_naive_in_timezone(device_time, tz)?,
                        is_utc_converted: false,
                        original_utc_datetime: None,
                    })
                }
            }
            _ => Ok(PunchInstant {
                local: now_in_timezone(self.clock.as_ref(), tz)?,
                is_utc_converted: false,
                original_utc_datetime: None,
            }),
        }
    }

    /// Records an interactive punch and updates the day record, all in one
    /// transaction. The punch direction is IN when the day has no regular
    /// attendance row yet, OUT otherwise.
    #[instrument(
        name = "handle_punch",
        skip(self, cmd),
        fields(employee_id = cmd.employee_id, company_id = cmd.company_id, source = %cmd.source)
    )]
    pub async fn handle_punch(&self, cmd: PunchCommand) -> AttendanceResult<PunchOutcome> {
        let mut uow = self.store.begin().await?;
        let outcome = self.record_punch(&mut *uow, cmd).await?;
        uow.commit().await?;

        info!(
            direction = %outcome.direction,
            punch_id = outcome.punch.id,
            attendance_id = outcome.attendance.id,
            is_late = outcome.punch.is_late,
            is_early_out = outcome.punch.is_early_out,
            "Punch recorded"
        );
        Ok(outcome)
    }

    async fn record_punch(
        &self,
        uow: &mut dyn UnitOfWork,
        cmd: PunchCommand,
    ) -> AttendanceResult<PunchOutcome> {
        let employee = uow
            .find_active_employee(cmd.employee_id, cmd.company_id)
            .await?
            .ok_or(AttendanceError::EmployeeNotFound)?;

        if cmd.source == PunchSource::Mobile && cmd.location.is_none() {
            return Err(AttendanceError::LocationRequired);
        }

        let tz = self.employee_timezone(&employee);
        let instant = self
            .resolve_punch_instant(uow, employee.company_id, tz, cmd.source, cmd.device_time)
            .await?;
        let punch_datetime = instant.local.naive_local();
        let punch_date = punch_datetime.date();

        let shift = self
            .shifts
            .resolve_shift(employee.id, punch_date)
            .await?
            .ok_or(AttendanceError::NoShiftAssigned { date: punch_date })?;

        let existing =
            find_regular_attendance(uow, employee.id, punch_date, ReadMode::ForUpdate).await?;
        let direction = match existing {
            Some(_) => PunchDirection::Out,
            None => PunchDirection::In,
        };

        let evaluation = evaluate_punch(
            TimeOfDay::from(punch_datetime.time()),
            direction,
            &shift.shift,
        );
        if !evaluation.allowed {
            info!(reason = %evaluation.reason, "Punch rejected by shift timing");
            return Err(AttendanceError::PunchRejected {
                reason: evaluation.reason,
            });
        }

        let window = self.settings.duplicate_window_minutes;
        if is_duplicate(uow, employee.id, punch_datetime, window).await? {
            info!(%punch_datetime, "Duplicate punch rejected");
            return Err(AttendanceError::DuplicatePunch {
                window_minutes: window,
            });
        }

        let instant_utc = instant.local.with_timezone(&Utc);
        let (latitude, longitude) = match cmd.location {
            Some(loc) => (Some(loc.latitude), Some(loc.longitude)),
            None => (None, None),
        };

        let mut punch = uow
            .insert_punch(NewPunch {
                employee_id: employee.id,
                company_id: employee.company_id,
                punch_datetime,
                timezone_offset: utc_offset(tz, instant_utc),
                punch_source: cmd.source,
                is_utc_converted: instant.is_utc_converted,
                original_utc_datetime: instant.original_utc_datetime,
                biometric_device_id: match cmd.source {
                    PunchSource::Biometric => employee.biometric_device_id.clone(),
                    _ => None,
                },
                device_info: cmd.device_info,
                ip_address: cmd.ip_address,
                latitude,
                longitude,
                is_late: evaluation.is_late,
                is_early_out: evaluation.is_early,
                is_manual_entry: cmd.source == PunchSource::Admin,
            })
            .await?;

        let day = match direction {
            PunchDirection::In => DayPunches::In(punch_datetime),
            PunchDirection::Out => DayPunches::Out(punch_datetime),
        };
        let outcome =
            upsert_daily_attendance(uow, employee.id, employee.company_id, punch_date, day).await?;

        uow.link_punches(&[punch.id], outcome.attendance.id).await?;
        punch.daily_attendance_id = Some(outcome.attendance.id);

        Ok(PunchOutcome {
            direction,
            punch,
            attendance: outcome.attendance,
            evaluation,
            shift,
            local_time: format(instant_utc, tz, DISPLAY_FORMAT),
        })
    }

    /// Appends a device punch to the ledger. Day records for these punches
    /// are built later by [`AttendanceService::process_punch_logs`].
    #[instrument(
        name = "push_biometric_punch",
        skip(self, push),
        fields(company_id = push.company_id, device_id = %push.device_id)
    )]
    pub async fn push_biometric_punch(&self, push: BiometricPunch) -> AttendanceResult<Punch> {
        let mut uow = self.store.begin().await?;

        let employee = uow
            .find_active_employee_by_biometric_device(&push.device_id, push.company_id)
            .await?
            .ok_or(AttendanceError::EmployeeNotFound)?;

        let tz = self.employee_timezone(&employee);
        let instant = self
            .resolve_punch_instant(
                &mut *uow,
                employee.company_id,
                tz,
                PunchSource::Biometric,
                Some(push.punch_time),
            )
            .await?;
        let punch_datetime = instant.local.naive_local();

        let window = self.settings.duplicate_window_minutes;
        if is_duplicate(&mut *uow, employee.id, punch_datetime, window).await? {
            info!(employee_id = employee.id, %punch_datetime, "Duplicate device punch rejected");
            return Err(AttendanceError::DuplicatePunch {
                window_minutes: window,
            });
        }

        let punch = uow
            .insert_punch(NewPunch {
                employee_id: employee.id,
                company_id: employee.company_id,
                punch_datetime,
                timezone_offset: utc_offset(tz, instant.local.with_timezone(&Utc)),
                punch_source: PunchSource::Biometric,
                is_utc_converted: instant.is_utc_converted,
                original_utc_datetime: instant.original_utc_datetime,
                biometric_device_id: Some(push.device_id),
                device_info: push.device_info,
                ip_address: push.ip_address,
                latitude: None,
                longitude: None,
                is_late: false,
                is_early_out: false,
                is_manual_entry: false,
            })
            .await?;

        uow.commit().await?;
        info!(employee_id = employee.id, punch_id = punch.id, "Device punch queued for reconciliation");
        Ok(punch)
    }
}
