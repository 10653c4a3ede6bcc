//! Daily attendance aggregation.
//!
//! Interactive punches and the biometric reconciliation pass both write day
//! records through [`upsert_daily_attendance`]: a day record spans the
//! earliest and the latest punch folded into it, and gets a punch-out as soon
//! as it has seen more than one punch.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::AttendanceService;
use super::shift_timing::{TimeOfDay, evaluate_punch};
use super::timezone::minutes_between;
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::daily_attendance::{DailyAttendance, NewDailyAttendance};
use crate::model::punch::{Punch, PunchDirection};
use crate::store::{PunchLogFilter, ReadMode, UnitOfWork};

/// Punches to fold into a day record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPunches {
    In(NaiveDateTime),
    Out(NaiveDateTime),
    Span {
        first: NaiveDateTime,
        last: NaiveDateTime,
    },
}

impl DayPunches {
    fn instants(self) -> Vec<NaiveDateTime> {
        match self {
            DayPunches::In(t) | DayPunches::Out(t) => vec![t],
            DayPunches::Span { first, last } => vec![first, last],
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub attendance: DailyAttendance,
    pub created: bool,
}

/// Hours between two punches, rounded to two decimals.
///
/// Punch times are employee wall-clock times, so this is wall-clock duration:
/// a day spanning a DST change is off by the size of the shift in offset.
pub fn hours_between(punch_in: NaiveDateTime, punch_out: NaiveDateTime) -> f64 {
    let hours = minutes_between(punch_in, punch_out) as f64 / 60.0;
    (hours * 100.0).round() / 100.0
}

/// Picks the row that represents the day: the latest open one, else the
/// latest one.
pub fn select_regular_row(rows: Vec<DailyAttendance>) -> Option<DailyAttendance> {
    let mut rows: Vec<DailyAttendance> = rows.into_iter().filter(|r| r.is_regular()).collect();
    match rows.iter().rposition(DailyAttendance::is_open) {
        Some(idx) => Some(rows.swap_remove(idx)),
        None => rows.pop(),
    }
}

pub async fn find_regular_attendance(
    uow: &mut dyn UnitOfWork,
    employee_id: u64,
    date: NaiveDate,
    mode: ReadMode,
) -> AttendanceResult<Option<DailyAttendance>> {
    let rows = uow.regular_attendance_rows(employee_id, date, mode).await?;
    if rows.len() > 1 {
        debug!(employee_id, %date, rows = rows.len(), "Multiple regular attendance rows");
    }
    Ok(select_regular_row(rows))
}

/// Merges `punches` into the existing day span. Returns the new
/// `(punch_in, punch_out)`.
pub fn merge_day_span(
    existing: Option<&DailyAttendance>,
    punches: DayPunches,
) -> (NaiveDateTime, Option<NaiveDateTime>) {
    let mut instants = punches.instants();
    if let Some(row) = existing {
        instants.extend(row.punch_in);
        instants.extend(row.punch_out);
    }

    let (mut earliest, mut latest) = (instants[0], instants[0]);
    for t in &instants[1..] {
        earliest = earliest.min(*t);
        latest = latest.max(*t);
    }

    let punch_out = (instants.len() > 1).then_some(latest);
    (earliest, punch_out)
}

pub async fn upsert_daily_attendance(
    uow: &mut dyn UnitOfWork,
    employee_id: u64,
    company_id: u64,
    date: NaiveDate,
    punches: DayPunches,
) -> AttendanceResult<UpsertOutcome> {
    let existing = find_regular_attendance(uow, employee_id, date, ReadMode::ForUpdate).await?;
    let (punch_in, punch_out) = merge_day_span(existing.as_ref(), punches);
    let total_hours = punch_out.map(|out| hours_between(punch_in, out));

    match existing {
        Some(mut row) => {
            row.punch_in = Some(punch_in);
            row.punch_out = punch_out;
            row.total_hours = total_hours;
            // breaks are not deducted yet
            row.worked_hours = total_hours;
            uow.update_attendance_punches(&row).await?;
            Ok(UpsertOutcome {
                attendance: row,
                created: false,
            })
        }
        None => {
            let row = uow
                .insert_daily_attendance(NewDailyAttendance {
                    employee_id,
                    company_id,
                    attendance_date: date,
                    punch_in,
                    punch_out,
                    total_hours,
                })
                .await?;
            Ok(UpsertOutcome {
                attendance: row,
                created: true,
            })
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReconciliationSummary {
    #[schema(value_type = String)]
    pub run_id: String,
    pub groups_processed: usize,
    pub punches_linked: usize,
    pub attendance_created: usize,
    pub attendance_updated: usize,
    pub groups_without_shift: usize,
}

fn group_by_employee_day(punches: Vec<Punch>) -> BTreeMap<(u64, NaiveDate), Vec<Punch>> {
    let mut groups: BTreeMap<(u64, NaiveDate), Vec<Punch>> = BTreeMap::new();
    for punch in punches {
        groups
            .entry((punch.employee_id, punch.punch_datetime.date()))
            .or_default()
            .push(punch);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|p| (p.punch_datetime, p.id));
    }
    groups
}

impl AttendanceService {
    /// Folds unlinked biometric punches into day records.
    ///
    /// The whole run shares one transaction: a failure in any group rolls
    /// back every group of the run.
    #[instrument(
        name = "process_punch_logs",
        skip(self),
        fields(run_id = tracing::field::Empty)
    )]
    pub async fn process_punch_logs(
        &self,
        filter: PunchLogFilter,
    ) -> AttendanceResult<ReconciliationSummary> {
        if filter.from > filter.to {
            return Err(AttendanceError::InvalidRange {
                from: filter.from,
                to: filter.to,
            });
        }

        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let mut uow = self.store.begin().await?;
        let punches = uow.unlinked_biometric_punches(&filter).await?;
        let mut summary = ReconciliationSummary {
            run_id,
            ..Default::default()
        };

        for ((employee_id, date), group) in group_by_employee_day(punches) {
            self.reconcile_group(&mut *uow, employee_id, date, &group, &mut summary)
                .await?;
        }

        uow.commit().await?;
        info!(
            groups = summary.groups_processed,
            punches = summary.punches_linked,
            created = summary.attendance_created,
            updated = summary.attendance_updated,
            "Punch log reconciliation complete"
        );

        Ok(summary)
    }

    async fn reconcile_group(
        &self,
        uow: &mut dyn UnitOfWork,
        employee_id: u64,
        date: NaiveDate,
        group: &[Punch],
        summary: &mut ReconciliationSummary,
    ) -> AttendanceResult<()> {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            return Ok(());
        };
        let last = (group.len() > 1).then_some(last);

        match self.shifts.resolve_shift(employee_id, date).await? {
            Some(resolved) => {
                let time_of = |p: &Punch| TimeOfDay::from(p.punch_datetime.time());

                let check_in = evaluate_punch(time_of(first), PunchDirection::In, &resolved.shift);
                if !check_in.allowed {
                    debug!(employee_id, %date, reason = %check_in.reason, "Biometric check-in outside window");
                }
                uow.set_punch_flags(first.id, check_in.is_late, false).await?;

                if let Some(last) = last {
                    let check_out =
                        evaluate_punch(time_of(last), PunchDirection::Out, &resolved.shift);
                    uow.set_punch_flags(last.id, false, check_out.is_early).await?;
                }
            }
            None => {
                warn!(employee_id, %date, "No shift resolved; attendance built without late/early flags");
                summary.groups_without_shift += 1;
            }
        }

        let punches = match last {
            Some(last) => DayPunches::Span {
                first: first.punch_datetime,
                last: last.punch_datetime,
            },
            None => DayPunches::In(first.punch_datetime),
        };
        let outcome =
            upsert_daily_attendance(uow, employee_id, first.company_id, date, punches).await?;

        let ids: Vec<u64> = group.iter().map(|p| p.id).collect();
        uow.link_punches(&ids, outcome.attendance.id).await?;

        summary.groups_processed += 1;
        summary.punches_linked += ids.len();
        if outcome.created {
            summary.attendance_created += 1;
        } else {
            summary.attendance_updated += 1;
        }

        Ok(())
    }
}
