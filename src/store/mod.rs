//! Persistence seam for the punch core.
//!
//! Every mutating operation runs on one [`UnitOfWork`], which is a single
//! database transaction. Dropping it without calling
//! [`UnitOfWork::commit`] rolls the transaction back.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::AttendanceResult;
use crate::model::break_log::{BreakLog, NewBreakLog};
use crate::model::daily_attendance::{DailyAttendance, NewDailyAttendance};
use crate::model::employee::Employee;
use crate::model::punch::{NewPunch, Punch};
use crate::model::shift::BreakRule;

#[cfg(test)]
pub mod memory;
pub mod mysql;

/// How a read that feeds a decision treats the rows it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Row and gap locks held until the unit of work ends.
    ForUpdate,
    /// Plain consistent read, no locks.
    Snapshot,
}

/// Selection of unlinked biometric punches for a reconciliation run.
/// Dates are calendar days in the employee's zone, inclusive.
#[derive(Debug, Clone)]
pub struct PunchLogFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub company_id: Option<u64>,
    pub employee_id: Option<u64>,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn begin(&self) -> AttendanceResult<Box<dyn UnitOfWork>>;
}

#[async_trait]
pub trait UnitOfWork: Send {
    // Employee directory
    async fn find_active_employee(
        &mut self,
        employee_id: u64,
        company_id: u64,
    ) -> AttendanceResult<Option<Employee>>;

    async fn find_active_employee_by_biometric_device(
        &mut self,
        device_id: &str,
        company_id: u64,
    ) -> AttendanceResult<Option<Employee>>;

    // Company settings
    async fn is_biometric_utc_enabled(&mut self, company_id: u64) -> AttendanceResult<bool>;

    // Break rule catalog
    async fn find_break_rule(
        &mut self,
        rule_id: u64,
        shift_id: u64,
    ) -> AttendanceResult<Option<BreakRule>>;

    // Punch ledger
    async fn insert_punch(&mut self, punch: NewPunch) -> AttendanceResult<Punch>;

    /// Whether a valid punch of the employee lies in `[from, to]`.
    async fn has_valid_punch_between(
        &mut self,
        employee_id: u64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AttendanceResult<bool>;

    async fn link_punches(
        &mut self,
        punch_ids: &[u64],
        daily_attendance_id: u64,
    ) -> AttendanceResult<()>;

    async fn set_punch_flags(
        &mut self,
        punch_id: u64,
        is_late: bool,
        is_early_out: bool,
    ) -> AttendanceResult<()>;

    /// Valid biometric punches with no day record yet, oldest first.
    async fn unlinked_biometric_punches(
        &mut self,
        filter: &PunchLogFilter,
    ) -> AttendanceResult<Vec<Punch>>;

    async fn punches_on(&mut self, employee_id: u64, date: NaiveDate)
    -> AttendanceResult<Vec<Punch>>;

    // Daily attendance
    /// All rows of the day with `workflow_master_id IS NULL`, by id.
    async fn regular_attendance_rows(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        mode: ReadMode,
    ) -> AttendanceResult<Vec<DailyAttendance>>;

    async fn insert_daily_attendance(
        &mut self,
        row: NewDailyAttendance,
    ) -> AttendanceResult<DailyAttendance>;

    /// Persists `punch_in`, `punch_out`, `total_hours` and `worked_hours`.
    async fn update_attendance_punches(&mut self, row: &DailyAttendance) -> AttendanceResult<()>;

    // Break logs
    async fn find_ongoing_break(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> AttendanceResult<Option<BreakLog>>;

    async fn insert_break(&mut self, log: NewBreakLog) -> AttendanceResult<BreakLog>;

    async fn complete_break(
        &mut self,
        break_id: u64,
        end: NaiveDateTime,
        duration_minutes: i64,
    ) -> AttendanceResult<()>;

    async fn breaks_on(&mut self, employee_id: u64, date: NaiveDate)
    -> AttendanceResult<Vec<BreakLog>>;

    async fn commit(self: Box<Self>) -> AttendanceResult<()>;
}
