//! Effective shift for an employee on a calendar day.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::warn;

use crate::error::AttendanceResult;
use crate::model::shift::{ResolvedShift, ShiftConfig, ShiftSource};

#[async_trait]
pub trait ShiftResolver: Send + Sync {
    async fn resolve_shift(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> AttendanceResult<Option<ResolvedShift>>;
}

#[derive(sqlx::FromRow)]
struct ShiftRow {
    id: u64,
    name: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    checkin_allowed_before_minutes: u32,
    grace_time_late_minutes: u32,
    grace_time_early_minutes: u32,
    source: String,
}

impl ShiftRow {
    fn into_resolved(self, fallback: ShiftSource) -> ResolvedShift {
        let source = ShiftSource::from_str(&self.source).unwrap_or_else(|_| {
            warn!(source = %self.source, shift_id = self.id, "Unknown roster source");
            fallback
        });

        ResolvedShift {
            shift: ShiftConfig {
                id: self.id,
                name: self.name,
                start_time: self.start_time,
                end_time: self.end_time,
                checkin_allowed_before_minutes: self.checkin_allowed_before_minutes,
                grace_time_late_minutes: self.grace_time_late_minutes,
                grace_time_early_minutes: self.grace_time_early_minutes,
            },
            source,
        }
    }
}

const SHIFT_COLUMNS: &str = r#"
    s.id, s.name, s.start_time, s.end_time, s.checkin_allowed_before_minutes,
    s.grace_time_late_minutes, s.grace_time_early_minutes
"#;

/// Resolution order: dated roster entry (roster, swap or rotation), then the
/// effective assignment, then the company default shift.
pub struct MySqlShiftResolver {
    pool: MySqlPool,
}

impl MySqlShiftResolver {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftResolver for MySqlShiftResolver {
    async fn resolve_shift(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> AttendanceResult<Option<ResolvedShift>> {
        let roster_sql = format!(
            r#"
            SELECT {SHIFT_COLUMNS}, r.source
            FROM shift_rosters r
            JOIN shifts s ON s.id = r.shift_id
            WHERE r.employee_id = ? AND r.roster_date = ? AND r.is_active = 1 AND s.is_active = 1
            ORDER BY r.id DESC
            LIMIT 1
            "#
        );
        let roster = sqlx::query_as::<_, ShiftRow>(&roster_sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = roster {
            return Ok(Some(row.into_resolved(ShiftSource::Roster)));
        }

        let assignment_sql = format!(
            r#"
            SELECT {SHIFT_COLUMNS}, 'assignment' AS source
            FROM employee_shift_assignments a
            JOIN shifts s ON s.id = a.shift_id
            WHERE a.employee_id = ?
            AND a.effective_from <= ?
            AND (a.effective_to IS NULL OR a.effective_to >= ?)
            AND s.is_active = 1
            ORDER BY a.effective_from DESC, a.id DESC
            LIMIT 1
            "#
        );
        let assignment = sqlx::query_as::<_, ShiftRow>(&assignment_sql)
            .bind(employee_id)
            .bind(date)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = assignment {
            return Ok(Some(row.into_resolved(ShiftSource::Assignment)));
        }

        let default_sql = format!(
            r#"
            SELECT {SHIFT_COLUMNS}, 'default' AS source
            FROM shifts s
            JOIN employees e ON e.company_id = s.company_id
            WHERE e.id = ? AND s.is_default = 1 AND s.is_active = 1
            ORDER BY s.id
            LIMIT 1
            "#
        );
        let default = sqlx::query_as::<_, ShiftRow>(&default_sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(default.map(|row| row.into_resolved(ShiftSource::Default)))
    }
}

#[cfg(test)]
pub use fixed::StaticShiftResolver;
