use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::AttendanceService;
use super::aggregator::find_regular_attendance;
use super::timezone::{minutes_between, now_in_timezone};
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::break_log::{AD_HOC_BREAK, BreakLog, BreakStatus, NewBreakLog};
use crate::model::shift::BreakRule;
use crate::store::{ReadMode, UnitOfWork};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BreakToggle {
    /// Configured break of the day's shift; omit for an ad-hoc break.
    #[schema(example = 2, nullable = true)]
    pub shift_break_rule_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BreakAction {
    Started,
    Ended,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BreakToggleOutcome {
    pub action: BreakAction,
    pub break_log: BreakLog,
}

impl AttendanceService {
    /// Starts a break, or ends the ongoing one. Requires an open regular
    /// attendance row for today.
    #[instrument(name = "toggle_break", skip(self, toggle))]
    pub async fn toggle_break(
        &self,
        employee_id: u64,
        company_id: u64,
        toggle: BreakToggle,
    ) -> AttendanceResult<BreakToggleOutcome> {
        let mut uow = self.store.begin().await?;
        let outcome = self
            .toggle_in_transaction(&mut *uow, employee_id, company_id, toggle)
            .await?;
        uow.commit().await?;

        info!(
            action = %outcome.action,
            break_id = outcome.break_log.id,
            duration = outcome.break_log.break_duration_minutes,
            "Break toggled"
        );
        Ok(outcome)
    }

    async fn toggle_in_transaction(
        &self,
        uow: &mut dyn UnitOfWork,
        employee_id: u64,
        company_id: u64,
        toggle: BreakToggle,
    ) -> AttendanceResult<BreakToggleOutcome> {
        let employee = uow
            .find_active_employee(employee_id, company_id)
            .await?
            .ok_or(AttendanceError::EmployeeNotFound)?;

        let tz = employee.timezone_or(&self.settings.default_timezone);
        let now = now_in_timezone(self.clock.as_ref(), tz)?.naive_local();
        let today = now.date();

        let attendance = find_regular_attendance(uow, employee.id, today, ReadMode::ForUpdate).await?;
        match attendance {
            Some(ref row) if row.punch_out.is_some() => {
                info!("Break refused: already clocked out");
                return Err(AttendanceError::AlreadyClockedOut);
            }
            Some(ref row) if row.punch_in.is_some() => {}
            _ => {
                info!("Break refused: not clocked in");
                return Err(AttendanceError::ClockInRequired);
            }
        }

        if let Some(mut ongoing) = uow.find_ongoing_break(employee.id, today).await? {
            let duration = minutes_between(ongoing.break_start_time, now).max(0);
            uow.complete_break(ongoing.id, now, duration).await?;

            ongoing.break_end_time = Some(now);
            ongoing.break_duration_minutes = Some(duration);
            ongoing.status = BreakStatus::Completed;
            return Ok(BreakToggleOutcome {
                action: BreakAction::Ended,
                break_log: ongoing,
            });
        }

        let rule = match toggle.shift_break_rule_id {
            Some(rule_id) => Some(self.break_rule_for_today(uow, employee.id, rule_id, today).await?),
            None => None,
        };

        let break_log = uow
            .insert_break(NewBreakLog {
                employee_id: employee.id,
                company_id: employee.company_id,
                break_date: today,
                shift_break_rule_id: rule.as_ref().map(|r| r.id),
                break_name: rule
                    .map(|r| r.name)
                    .unwrap_or_else(|| AD_HOC_BREAK.to_string()),
                break_start_time: now,
            })
            .await?;

        Ok(BreakToggleOutcome {
            action: BreakAction::Started,
            break_log,
        })
    }

    /// Resolves today's shift once and checks the rule belongs to it.
    async fn break_rule_for_today(
        &self,
        uow: &mut dyn UnitOfWork,
        employee_id: u64,
        rule_id: u64,
        today: chrono::NaiveDate,
    ) -> AttendanceResult<BreakRule> {
        let shift = self
            .shifts
            .resolve_shift(employee_id, today)
            .await?
            .ok_or(AttendanceError::NoShiftAssigned { date: today })?;

        uow.find_break_rule(rule_id, shift.shift.id)
            .await?
            .ok_or(AttendanceError::BreakRuleNotFound { rule_id })
    }
}
