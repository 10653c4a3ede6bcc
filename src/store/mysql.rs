use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use moka::future::Cache;
use sqlx::{MySql, MySqlPool, Transaction};
use std::time::Duration;

use super::{AttendanceStore, PunchLogFilter, ReadMode, UnitOfWork};
use crate::error::AttendanceResult;
use crate::model::break_log::{BreakLog, BreakStatus, NewBreakLog};
use crate::model::daily_attendance::{DailyAttendance, NewDailyAttendance};
use crate::model::employee::Employee;
use crate::model::punch::{NewPunch, Punch, PunchSource};
use crate::model::shift::BreakRule;

const EMPLOYEE_COLUMNS: &str = r#"
    id, company_id, employee_code, first_name, last_name,
    timezone, biometric_device_id, status
"#;

const PUNCH_COLUMNS: &str = r#"
    id, employee_id, company_id, punch_datetime, timezone_offset, punch_source,
    is_utc_converted, original_utc_datetime, biometric_device_id, device_info,
    ip_address, latitude, longitude, is_valid, is_duplicate, is_late,
    is_early_out, is_manual_entry, daily_attendance_id
"#;

const ATTENDANCE_COLUMNS: &str = r#"
    id, employee_id, company_id, attendance_date, punch_in, punch_out,
    total_hours, worked_hours, attendance_status, pay_day, workflow_master_id
"#;

const BREAK_COLUMNS: &str = r#"
    id, employee_id, company_id, break_date, shift_break_rule_id, break_name,
    break_start_time, break_end_time, break_duration_minutes, status
"#;

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

pub struct MySqlStore {
    pool: MySqlPool,
    /// company_id => biometric devices report UTC
    utc_flags: Cache<u64, bool>,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, settings_ttl: Duration) -> Self {
        Self {
            pool,
            utc_flags: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(settings_ttl)
                .build(),
        }
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn begin(&self) -> AttendanceResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MySqlUnitOfWork {
            tx,
            utc_flags: self.utc_flags.clone(),
        }))
    }
}

pub struct MySqlUnitOfWork {
    tx: Transaction<'static, MySql>,
    utc_flags: Cache<u64, bool>,
}

#[async_trait]
impl UnitOfWork for MySqlUnitOfWork {
    async fn find_active_employee(
        &mut self,
        employee_id: u64,
        company_id: u64,
    ) -> AttendanceResult<Option<Employee>> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ? AND company_id = ?"
        );
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(employee_id)
            .bind(company_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(employee.filter(Employee::is_active))
    }

    async fn find_active_employee_by_biometric_device(
        &mut self,
        device_id: &str,
        company_id: u64,
    ) -> AttendanceResult<Option<Employee>> {
        let sql = format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees
            WHERE biometric_device_id = ? AND company_id = ? AND status = 'active'
            ORDER BY id
            LIMIT 1
            "#
        );
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(device_id)
            .bind(company_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(employee)
    }

    async fn is_biometric_utc_enabled(&mut self, company_id: u64) -> AttendanceResult<bool> {
        if let Some(enabled) = self.utc_flags.get(&company_id).await {
            return Ok(enabled);
        }

        let enabled = sqlx::query_scalar::<_, bool>(
            "SELECT biometric_utc_enabled FROM companies WHERE id = ?",
        )
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .unwrap_or(false);

        self.utc_flags.insert(company_id, enabled).await;
        Ok(enabled)
    }

    async fn find_break_rule(
        &mut self,
        rule_id: u64,
        shift_id: u64,
    ) -> AttendanceResult<Option<BreakRule>> {
        let rule = sqlx::query_as::<_, BreakRule>(
            r#"
            SELECT id, shift_id, name, duration_minutes, is_paid
            FROM shift_break_rules
            WHERE id = ? AND shift_id = ? AND is_active = 1
            "#,
        )
        .bind(rule_id)
        .bind(shift_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(rule)
    }

    async fn insert_punch(&mut self, punch: NewPunch) -> AttendanceResult<Punch> {
        let result = sqlx::query(
            r#"
            INSERT INTO punch_logs
                (employee_id, company_id, punch_datetime, timezone_offset, punch_source,
                 is_utc_converted, original_utc_datetime, biometric_device_id, device_info,
                 ip_address, latitude, longitude, is_valid, is_duplicate, is_late,
                 is_early_out, is_manual_entry)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, 0, ?, ?, ?)
            "#,
        )
        .bind(punch.employee_id)
        .bind(punch.company_id)
        .bind(punch.punch_datetime)
        .bind(&punch.timezone_offset)
        .bind(punch.punch_source.as_ref())
        .bind(punch.is_utc_converted)
        .bind(punch.original_utc_datetime)
        .bind(&punch.biometric_device_id)
        .bind(&punch.device_info)
        .bind(&punch.ip_address)
        .bind(punch.latitude)
        .bind(punch.longitude)
        .bind(punch.is_late)
        .bind(punch.is_early_out)
        .bind(punch.is_manual_entry)
        .execute(&mut *self.tx)
        .await?;

        Ok(punch.into_punch(result.last_insert_id()))
    }

    async fn has_valid_punch_between(
        &mut self,
        employee_id: u64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AttendanceResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM punch_logs
            WHERE employee_id = ?
            AND is_valid = 1
            AND punch_datetime BETWEEN ? AND ?
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count > 0)
    }

    async fn link_punches(
        &mut self,
        punch_ids: &[u64],
        daily_attendance_id: u64,
    ) -> AttendanceResult<()> {
        if punch_ids.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; punch_ids.len()].join(", ");
        let sql = format!(
            "UPDATE punch_logs SET daily_attendance_id = ? WHERE id IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql).bind(daily_attendance_id);
        for id in punch_ids {
            query = query.bind(*id);
        }
        query.execute(&mut *self.tx).await?;

        Ok(())
    }

    async fn set_punch_flags(
        &mut self,
        punch_id: u64,
        is_late: bool,
        is_early_out: bool,
    ) -> AttendanceResult<()> {
        sqlx::query("UPDATE punch_logs SET is_late = ?, is_early_out = ? WHERE id = ?")
            .bind(is_late)
            .bind(is_early_out)
            .bind(punch_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn unlinked_biometric_punches(
        &mut self,
        filter: &PunchLogFilter,
    ) -> AttendanceResult<Vec<Punch>> {
        let mut where_sql = String::from(
            r#"
            WHERE daily_attendance_id IS NULL
            AND is_valid = 1
            AND punch_source = ?
            AND DATE(punch_datetime) BETWEEN ? AND ?
            "#,
        );
        let mut args = vec![FilterValue::Date(filter.from), FilterValue::Date(filter.to)];

        if let Some(company_id) = filter.company_id {
            where_sql.push_str(" AND company_id = ?");
            args.push(FilterValue::U64(company_id));
        }
        if let Some(employee_id) = filter.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(employee_id));
        }

        let sql = format!(
            "SELECT {PUNCH_COLUMNS} FROM punch_logs {where_sql} ORDER BY employee_id, punch_datetime, id"
        );

        let mut query = sqlx::query_as::<_, Punch>(&sql).bind(PunchSource::Biometric.as_ref());
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Date(d) => query.bind(d),
            };
        }

        Ok(query.fetch_all(&mut *self.tx).await?)
    }

    async fn punches_on(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> AttendanceResult<Vec<Punch>> {
        let sql = format!(
            r#"
            SELECT {PUNCH_COLUMNS}
            FROM punch_logs
            WHERE employee_id = ? AND DATE(punch_datetime) = ? AND is_valid = 1
            ORDER BY punch_datetime, id
            "#
        );
        let punches = sqlx::query_as::<_, Punch>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(punches)
    }

    async fn regular_attendance_rows(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        mode: ReadMode,
    ) -> AttendanceResult<Vec<DailyAttendance>> {
        // FOR UPDATE keeps the IN/OUT decision and the write in one critical section
        let lock = match mode {
            ReadMode::ForUpdate => "FOR UPDATE",
            ReadMode::Snapshot => "",
        };
        let sql = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM daily_attendance
            WHERE employee_id = ?
            AND attendance_date = ?
            AND workflow_master_id IS NULL
            ORDER BY id
            {lock}
            "#
        );
        let rows = sqlx::query_as::<_, DailyAttendance>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows)
    }

    async fn insert_daily_attendance(
        &mut self,
        row: NewDailyAttendance,
    ) -> AttendanceResult<DailyAttendance> {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_attendance
                (employee_id, company_id, attendance_date, punch_in, punch_out,
                 total_hours, worked_hours, attendance_status, pay_day)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'present', 1)
            "#,
        )
        .bind(row.employee_id)
        .bind(row.company_id)
        .bind(row.attendance_date)
        .bind(row.punch_in)
        .bind(row.punch_out)
        .bind(row.total_hours)
        .bind(row.total_hours)
        .execute(&mut *self.tx)
        .await?;

        Ok(row.into_attendance(result.last_insert_id()))
    }

    async fn update_attendance_punches(&mut self, row: &DailyAttendance) -> AttendanceResult<()> {
        sqlx::query(
            r#"
            UPDATE daily_attendance
            SET punch_in = ?, punch_out = ?, total_hours = ?, worked_hours = ?
            WHERE id = ?
            "#,
        )
        .bind(row.punch_in)
        .bind(row.punch_out)
        .bind(row.total_hours)
        .bind(row.worked_hours)
        .bind(row.id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn find_ongoing_break(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> AttendanceResult<Option<BreakLog>> {
        let sql = format!(
            r#"
            SELECT {BREAK_COLUMNS}
            FROM break_logs
            WHERE employee_id = ? AND break_date = ? AND status = ?
            ORDER BY id DESC
            LIMIT 1
            FOR UPDATE
            "#
        );
        let log = sqlx::query_as::<_, BreakLog>(&sql)
            .bind(employee_id)
            .bind(date)
            .bind(BreakStatus::Ongoing.as_ref())
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(log)
    }

    async fn insert_break(&mut self, log: NewBreakLog) -> AttendanceResult<BreakLog> {
        let result = sqlx::query(
            r#"
            INSERT INTO break_logs
                (employee_id, company_id, break_date, shift_break_rule_id, break_name,
                 break_start_time, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(log.employee_id)
        .bind(log.company_id)
        .bind(log.break_date)
        .bind(log.shift_break_rule_id)
        .bind(&log.break_name)
        .bind(log.break_start_time)
        .bind(BreakStatus::Ongoing.as_ref())
        .execute(&mut *self.tx)
        .await?;

        Ok(log.into_break_log(result.last_insert_id()))
    }

    async fn complete_break(
        &mut self,
        break_id: u64,
        end: NaiveDateTime,
        duration_minutes: i64,
    ) -> AttendanceResult<()> {
        sqlx::query(
            r#"
            UPDATE break_logs
            SET break_end_time = ?, break_duration_minutes = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(end)
        .bind(duration_minutes)
        .bind(BreakStatus::Completed.as_ref())
        .bind(break_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn breaks_on(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> AttendanceResult<Vec<BreakLog>> {
        let sql = format!(
            r#"
            SELECT {BREAK_COLUMNS}
            FROM break_logs
            WHERE employee_id = ? AND break_date = ?
            ORDER BY break_start_time, id
            "#
        );
        let logs = sqlx::query_as::<_, BreakLog>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(logs)
    }

    async fn commit(self: Box<Self>) -> AttendanceResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
