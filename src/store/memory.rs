//! In-memory store with the same transactional behaviour as the MySQL one:
//! a unit of work edits a private snapshot that replaces the shared state on
//! commit only.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{AttendanceStore, PunchLogFilter, ReadMode, UnitOfWork};
use crate::error::AttendanceResult;
use crate::model::break_log::{BreakLog, BreakStatus, NewBreakLog};
use crate::model::daily_attendance::{DailyAttendance, NewDailyAttendance};
use crate::model::employee::Employee;
use crate::model::punch::{NewPunch, Punch, PunchSource};
use crate::model::shift::BreakRule;

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub employees: Vec<Employee>,
    pub utc_companies: HashSet<u64>,
    pub break_rules: Vec<BreakRule>,
    pub punches: Vec<Punch>,
    pub attendance: Vec<DailyAttendance>,
    pub breaks: Vec<BreakLog>,
    /// Makes `link_punches` fail for this employee's punches.
    pub fail_link_for_employee: Option<u64>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    /// `ForUpdate` reads issued so far, committed or not.
    locking_reads: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn seed(&self, f: impl FnOnce(&mut MemoryState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn snapshot(&self) -> MemoryState {
        self.state.lock().unwrap().clone()
    }

    pub fn locking_reads(&self) -> usize {
        self.locking_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn begin(&self) -> AttendanceResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork {
            shared: self.state.clone(),
            working: self.snapshot(),
            locking_reads: self.locking_reads.clone(),
        }))
    }
}

struct MemoryUnitOfWork {
    shared: Arc<Mutex<MemoryState>>,
    working: MemoryState,
    locking_reads: Arc<AtomicUsize>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_active_employee(
        &mut self,
        employee_id: u64,
        company_id: u64,
    ) -> AttendanceResult<Option<Employee>> {
        Ok(self
            .working
            .employees
            .iter()
            .find(|e| e.id == employee_id && e.company_id == company_id && e.is_active())
            .cloned())
    }

    async fn find_active_employee_by_biometric_device(
        &mut self,
        device_id: &str,
        company_id: u64,
    ) -> AttendanceResult<Option<Employee>> {
        Ok(self
            .working
            .employees
            .iter()
            .find(|e| {
                e.company_id == company_id
                    && e.is_active()
                    && e.biometric_device_id.as_deref() == Some(device_id)
            })
            .cloned())
    }

    async fn is_biometric_utc_enabled(&mut self, company_id: u64) -> AttendanceResult<bool> {
        Ok(self.working.utc_companies.contains(&company_id))
    }

    async fn find_break_rule(
        &mut self,
        rule_id: u64,
        shift_id: u64,
    ) -> AttendanceResult<Option<BreakRule>> {
        Ok(self
            .working
            .break_rules
            .iter()
            .find(|r| r.id == rule_id && r.shift_id == shift_id)
            .cloned())
    }

    async fn insert_punch(&mut self, punch: NewPunch) -> AttendanceResult<Punch> {
        let punch = punch.into_punch(self.working.punches.len() as u64 + 1);
        self.working.punches.push(punch.clone());
        Ok(punch)
    }

    async fn has_valid_punch_between(
        &mut self,
        employee_id: u64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AttendanceResult<bool> {
        Ok(self.working.punches.iter().any(|p| {
            p.employee_id == employee_id
                && p.is_valid
                && p.punch_datetime >= from
                && p.punch_datetime <= to
        }))
    }

    async fn link_punches(
        &mut self,
        punch_ids: &[u64],
        daily_attendance_id: u64,
    ) -> AttendanceResult<()> {
        let fail_for = self.working.fail_link_for_employee;
        for punch in self
            .working
            .punches
            .iter_mut()
            .filter(|p| punch_ids.contains(&p.id))
        {
            if Some(punch.employee_id) == fail_for {
                return Err(sqlx::Error::Protocol("injected link failure".into()).into());
            }
            punch.daily_attendance_id = Some(daily_attendance_id);
        }
        Ok(())
    }

    async fn set_punch_flags(
        &mut self,
        punch_id: u64,
        is_late: bool,
        is_early_out: bool,
    ) -> AttendanceResult<()> {
        if let Some(punch) = self.working.punches.iter_mut().find(|p| p.id == punch_id) {
            punch.is_late = is_late;
            punch.is_early_out = is_early_out;
        }
        Ok(())
    }

    async fn unlinked_biometric_punches(
        &mut self,
        filter: &PunchLogFilter,
    ) -> AttendanceResult<Vec<Punch>> {
        let mut punches: Vec<Punch> = self
            .working
            .punches
            .iter()
            .filter(|p| {
                let date = p.punch_datetime.date();
                p.daily_attendance_id.is_none()
                    && p.is_valid
                    && p.punch_source == PunchSource::Biometric
                    && date >= filter.from
                    && date <= filter.to
                    && filter.company_id.is_none_or(|c| c == p.company_id)
                    && filter.employee_id.is_none_or(|e| e == p.employee_id)
            })
            .cloned()
            .collect();
        punches.sort_by_key(|p| (p.employee_id, p.punch_datetime, p.id));
        Ok(punches)
    }

    async fn punches_on(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> AttendanceResult<Vec<Punch>> {
        let mut punches: Vec<Punch> = self
            .working
            .punches
            .iter()
            .filter(|p| p.employee_id == employee_id && p.punch_datetime.date() == date && p.is_valid)
            .cloned()
            .collect();
        punches.sort_by_key(|p| (p.punch_datetime, p.id));
        Ok(punches)
    }

    async fn regular_attendance_rows(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        mode: ReadMode,
    ) -> AttendanceResult<Vec<DailyAttendance>> {
        if mode == ReadMode::ForUpdate {
            self.locking_reads.fetch_add(1, Ordering::SeqCst);
        }
        Ok(self
            .working
            .attendance
            .iter()
            .filter(|a| a.employee_id == employee_id && a.attendance_date == date && a.is_regular())
            .cloned()
            .collect())
    }

    async fn insert_daily_attendance(
        &mut self,
        row: NewDailyAttendance,
    ) -> AttendanceResult<DailyAttendance> {
        let row = row.into_attendance(self.working.attendance.len() as u64 + 1);
        self.working.attendance.push(row.clone());
        Ok(row)
    }

    async fn update_attendance_punches(&mut self, row: &DailyAttendance) -> AttendanceResult<()> {
        if let Some(existing) = self.working.attendance.iter_mut().find(|a| a.id == row.id) {
            existing.punch_in = row.punch_in;
            existing.punch_out = row.punch_out;
            existing.total_hours = row.total_hours;
            existing.worked_hours = row.worked_hours;
        }
        Ok(())
    }

    async fn find_ongoing_break(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> AttendanceResult<Option<BreakLog>> {
        Ok(self
            .working
            .breaks
            .iter()
            .rev()
            .find(|b| {
                b.employee_id == employee_id
                    && b.break_date == date
                    && b.status == BreakStatus::Ongoing
            })
            .cloned())
    }

    async fn insert_break(&mut self, log: NewBreakLog) -> AttendanceResult<BreakLog> {
        let log = log.into_break_log(self.working.breaks.len() as u64 + 1);
        self.working.breaks.push(log.clone());
        Ok(log)
    }

    async fn complete_break(
        &mut self,
        break_id: u64,
        end: NaiveDateTime,
        duration_minutes: i64,
    ) -> AttendanceResult<()> {
        if let Some(log) = self.working.breaks.iter_mut().find(|b| b.id == break_id) {
            log.break_end_time = Some(end);
            log.break_duration_minutes = Some(duration_minutes);
            log.status = BreakStatus::Completed;
        }
        Ok(())
    }

    async fn breaks_on(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> AttendanceResult<Vec<BreakLog>> {
        Ok(self
            .working
            .breaks
            .iter()
            .filter(|b| b.employee_id == employee_id && b.break_date == date)
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> AttendanceResult<()> {
        let MemoryUnitOfWork { shared, working, .. } = *self;
        *shared.lock().unwrap() = working;
        Ok(())
    }
}
