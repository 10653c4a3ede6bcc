use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::sync::Arc;

use super::breaks::{BreakAction, BreakToggle};
use super::clock::FixedClock;
use super::punch::{BiometricPunch, GeoLocation, PunchCommand};
use super::{AttendanceService, AttendanceSettings};
use crate::error::AttendanceError;
use crate::model::break_log::{AD_HOC_BREAK, BreakStatus};
use crate::model::daily_attendance::{AttendanceStatus, DailyAttendance};
use crate::model::employee::Employee;
use crate::model::punch::{PunchDirection, PunchSource};
use crate::model::shift::{BreakRule, ShiftConfig};
use crate::shift_resolver::StaticShiftResolver;
use crate::store::PunchLogFilter;
use crate::store::memory::MemoryStore;

const COMPANY: u64 = 10;
const UTC_EMPLOYEE: u64 = 1;
const KOLKATA_EMPLOYEE: u64 = 2;

struct Harness {
    service: AttendanceService,
    store: MemoryStore,
    shifts: Arc<StaticShiftResolver>,
    clock: Arc<FixedClock>,
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

fn utc_at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day().and_hms_opt(h, m, 0).unwrap())
}

fn local(h: u32, m: u32) -> NaiveDateTime {
    day().and_hms_opt(h, m, 0).unwrap()
}

fn employee(id: u64, timezone: &str, device: &str) -> Employee {
    Employee {
        id,
        company_id: COMPANY,
        employee_code: format!("EMP-{id:03}"),
        first_name: "Test".into(),
        last_name: format!("Employee {id}"),
        timezone: Some(timezone.into()),
        biometric_device_id: Some(device.into()),
        status: "active".into(),
    }
}

fn day_shift() -> ShiftConfig {
    ShiftConfig {
        id: 1,
        name: "General".into(),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        checkin_allowed_before_minutes: 120,
        grace_time_late_minutes: 10,
        grace_time_early_minutes: 10,
    }
}

fn harness() -> Harness {
    let store = MemoryStore::default();
    store.seed(|state| {
        state.employees.push(employee(UTC_EMPLOYEE, "UTC", "DEV-1"));
        state.employees.push(employee(KOLKATA_EMPLOYEE, "Asia/Kolkata", "DEV-2"));
        let mut inactive = employee(3, "UTC", "DEV-3");
        inactive.status = "inactive".into();
        state.employees.push(inactive);
        state.break_rules.push(BreakRule {
            id: 5,
            shift_id: 1,
            name: "Lunch".into(),
            duration_minutes: 60,
            is_paid: false,
        });
    });

    let shifts = Arc::new(StaticShiftResolver::default());
    shifts.assign(UTC_EMPLOYEE, day_shift());
    shifts.assign(KOLKATA_EMPLOYEE, day_shift());

    let clock = Arc::new(FixedClock::new(utc_at(9, 0)));
    let service = AttendanceService::new(
        Arc::new(store.clone()),
        shifts.clone(),
        clock.clone(),
        AttendanceSettings::default(),
    );

    Harness {
        service,
        store,
        shifts,
        clock,
    }
}

fn web_punch(employee_id: u64) -> PunchCommand {
    PunchCommand {
        employee_id,
        company_id: COMPANY,
        source: PunchSource::Web,
        device_time: None,
        location: None,
        device_info: Some("Firefox".into()),
        ip_address: Some("10.0.0.8".into()),
    }
}

fn device_punch(device: &str, at: NaiveDateTime) -> BiometricPunch {
    BiometricPunch {
        company_id: COMPANY,
        device_id: device.into(),
        punch_time: at,
        device_info: None,
        ip_address: None,
    }
}

fn week() -> PunchLogFilter {
    PunchLogFilter {
        from: day(),
        to: day() + Duration::days(6),
        company_id: Some(COMPANY),
        employee_id: None,
    }
}

// -----------------------------------------------------------------------
// Interactive punches
// -----------------------------------------------------------------------

#[actix_web::test]
async fn first_punch_is_in_and_next_is_out() {
    let h = harness();

    let first = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    assert_eq!(first.direction, PunchDirection::In);
    assert_eq!(first.attendance.punch_in, Some(local(9, 0)));
    assert_eq!(first.attendance.punch_out, None);
    assert_eq!(first.attendance.attendance_status, AttendanceStatus::Present);
    assert_eq!(first.attendance.pay_day, 1.0);
    assert_eq!(first.punch.daily_attendance_id, Some(first.attendance.id));

    h.clock.set(utc_at(18, 0));
    let second = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    assert_eq!(second.direction, PunchDirection::Out);
    assert_eq!(second.attendance.id, first.attendance.id);
    assert_eq!(second.attendance.punch_out, Some(local(18, 0)));
    assert_eq!(second.attendance.total_hours, Some(9.0));
    assert_eq!(second.attendance.worked_hours, Some(9.0));

    let state = h.store.snapshot();
    assert_eq!(state.attendance.len(), 1);
    assert_eq!(state.punches.len(), 2);
    assert!(state.punches.iter().all(|p| p.daily_attendance_id == Some(first.attendance.id)));
}

#[actix_web::test]
async fn duplicate_punch_is_rejected_without_a_second_row() {
    let h = harness();
    h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();

    h.clock.advance(Duration::seconds(30));
    let err = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap_err();
    assert!(matches!(err, AttendanceError::DuplicatePunch { window_minutes: 1 }));

    let state = h.store.snapshot();
    assert_eq!(state.punches.len(), 1);
    assert_eq!(state.attendance[0].punch_out, None);

    h.clock.advance(Duration::minutes(2));
    let out = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    assert_eq!(out.direction, PunchDirection::Out);
}

#[actix_web::test]
async fn too_early_check_in_is_rejected_and_not_persisted() {
    let h = harness();
    h.clock.set(utc_at(6, 59));

    let err = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap_err();
    assert!(matches!(err, AttendanceError::PunchRejected { .. }));

    let state = h.store.snapshot();
    assert!(state.punches.is_empty());
    assert!(state.attendance.is_empty());

    h.clock.set(utc_at(7, 0));
    let accepted = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    assert!(!accepted.punch.is_late);
}

#[actix_web::test]
async fn check_in_after_midnight_is_too_early_for_a_day_shift() {
    let h = harness();
    for (hour, minute) in [(0, 10), (6, 59)] {
        h.clock.set(utc_at(hour, minute));
        let err = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::PunchRejected { .. }));
    }

    let state = h.store.snapshot();
    assert!(state.punches.is_empty());
    assert!(state.attendance.is_empty());
}

#[actix_web::test]
async fn late_in_and_early_out_are_flagged() {
    let h = harness();
    h.clock.set(utc_at(9, 11));
    let check_in = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    assert!(check_in.punch.is_late);
    assert!(check_in.evaluation.is_late);

    h.clock.set(utc_at(17, 0));
    let check_out = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    assert!(check_out.punch.is_early_out);
    assert!(!check_out.punch.is_late);
}

#[actix_web::test]
async fn mobile_punch_requires_location() {
    let h = harness();
    let mut cmd = web_punch(UTC_EMPLOYEE);
    cmd.source = PunchSource::Mobile;

    let err = h.service.handle_punch(cmd.clone()).await.unwrap_err();
    assert!(matches!(err, AttendanceError::LocationRequired));

    cmd.location = Some(GeoLocation {
        latitude: 23.81,
        longitude: 90.41,
    });
    let outcome = h.service.handle_punch(cmd).await.unwrap();
    assert_eq!(outcome.punch.latitude, Some(23.81));
    assert_eq!(outcome.punch.longitude, Some(90.41));
    assert_eq!(outcome.punch.punch_source, PunchSource::Mobile);
}

#[actix_web::test]
async fn unknown_inactive_or_foreign_employee_is_not_found() {
    let h = harness();
    for (employee_id, company_id) in [(99, COMPANY), (3, COMPANY), (UTC_EMPLOYEE, 11)] {
        let mut cmd = web_punch(employee_id);
        cmd.company_id = company_id;
        let err = h.service.handle_punch(cmd).await.unwrap_err();
        assert!(matches!(err, AttendanceError::EmployeeNotFound));
    }
}

#[actix_web::test]
async fn punch_without_shift_fails() {
    let h = harness();
    h.store.seed(|state| state.employees.push(employee(4, "UTC", "DEV-4")));

    let err = h.service.handle_punch(web_punch(4)).await.unwrap_err();
    assert!(matches!(err, AttendanceError::NoShiftAssigned { date } if date == day()));
    assert!(h.store.snapshot().punches.is_empty());
}

#[actix_web::test]
async fn admin_punch_is_a_manual_entry() {
    let h = harness();
    let mut cmd = web_punch(UTC_EMPLOYEE);
    cmd.source = PunchSource::Admin;

    let outcome = h.service.handle_punch(cmd).await.unwrap();
    assert!(outcome.punch.is_manual_entry);
}

#[actix_web::test]
async fn punch_time_is_recorded_in_employee_zone() {
    let h = harness();
    // 09:05 in Kolkata
    h.clock.set(utc_at(3, 35));

    let outcome = h.service.handle_punch(web_punch(KOLKATA_EMPLOYEE)).await.unwrap();
    assert_eq!(outcome.punch.punch_datetime, local(9, 5));
    assert_eq!(outcome.punch.timezone_offset, "+05:30");
    assert_eq!(outcome.attendance.attendance_date, day());
    assert_eq!(outcome.local_time, "2026-01-05 09:05:00");
    assert!(!outcome.punch.is_late);
}

#[actix_web::test]
async fn workflow_rows_do_not_count_as_punch_state() {
    let h = harness();
    h.store.seed(|state| {
        state.attendance.push(DailyAttendance {
            id: 1,
            employee_id: UTC_EMPLOYEE,
            company_id: COMPANY,
            attendance_date: day(),
            punch_in: None,
            punch_out: None,
            total_hours: None,
            worked_hours: None,
            attendance_status: AttendanceStatus::Leave,
            pay_day: 0.5,
            workflow_master_id: Some(42),
        });
    });

    let outcome = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    assert_eq!(outcome.direction, PunchDirection::In);
    assert_ne!(outcome.attendance.id, 1);
    assert_eq!(h.store.snapshot().attendance.len(), 2);
}

#[actix_web::test]
async fn failure_after_insert_rolls_back_the_punch() {
    let h = harness();
    h.store.seed(|state| state.fail_link_for_employee = Some(UTC_EMPLOYEE));

    let err = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap_err();
    assert!(matches!(err, AttendanceError::Database(_)));

    let state = h.store.snapshot();
    assert!(state.punches.is_empty());
    assert!(state.attendance.is_empty());
}

#[actix_web::test]
async fn interactive_biometric_punch_uses_device_time() {
    let h = harness();
    h.store.seed(|state| {
        state.utc_companies.insert(COMPANY);
    });
    let mut cmd = web_punch(KOLKATA_EMPLOYEE);
    cmd.source = PunchSource::Biometric;
    cmd.device_time = Some(local(3, 40));

    let outcome = h.service.handle_punch(cmd).await.unwrap();
    assert_eq!(outcome.punch.punch_datetime, local(9, 10));
    assert!(outcome.punch.is_utc_converted);
    assert_eq!(outcome.punch.original_utc_datetime, Some(local(3, 40)));
    assert_eq!(outcome.punch.biometric_device_id.as_deref(), Some("DEV-2"));
}

// -----------------------------------------------------------------------
// Biometric push and reconciliation
// -----------------------------------------------------------------------

#[actix_web::test]
async fn biometric_push_only_appends_to_the_ledger() {
    let h = harness();
    h.store.seed(|state| {
        state.utc_companies.insert(COMPANY);
    });

    let punch = h
        .service
        .push_biometric_punch(device_punch("DEV-2", local(3, 35)))
        .await
        .unwrap();
    assert_eq!(punch.punch_datetime, local(9, 5));
    assert!(punch.is_utc_converted);
    assert_eq!(punch.original_utc_datetime, Some(local(3, 35)));
    assert_eq!(punch.daily_attendance_id, None);
    assert!(!punch.is_late);

    let state = h.store.snapshot();
    assert!(state.attendance.is_empty());
    assert_eq!(h.shifts.calls(), 0);
}

#[actix_web::test]
async fn biometric_push_without_utc_flag_keeps_wall_time() {
    let h = harness();
    let punch = h
        .service
        .push_biometric_punch(device_punch("DEV-2", local(9, 5)))
        .await
        .unwrap();
    assert_eq!(punch.punch_datetime, local(9, 5));
    assert!(!punch.is_utc_converted);
    assert_eq!(punch.original_utc_datetime, None);
}

#[actix_web::test]
async fn biometric_push_rejects_unknown_device_and_duplicates() {
    let h = harness();
    let err = h
        .service
        .push_biometric_punch(device_punch("DEV-404", local(9, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::EmployeeNotFound));

    h.service
        .push_biometric_punch(device_punch("DEV-1", local(9, 0)))
        .await
        .unwrap();
    let err = h
        .service
        .push_biometric_punch(device_punch("DEV-1", local(9, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::DuplicatePunch { .. }));
    assert_eq!(h.store.snapshot().punches.len(), 1);
}

#[actix_web::test]
async fn reconciliation_builds_day_records_from_first_and_last_punch() {
    let h = harness();
    for at in [local(8, 55), local(12, 0), local(18, 5)] {
        h.service.push_biometric_punch(device_punch("DEV-1", at)).await.unwrap();
    }
    let next_day = local(9, 30) + Duration::days(1);
    h.service.push_biometric_punch(device_punch("DEV-1", next_day)).await.unwrap();

    let summary = h.service.process_punch_logs(week()).await.unwrap();
    assert_eq!(summary.groups_processed, 2);
    assert_eq!(summary.punches_linked, 4);
    assert_eq!(summary.attendance_created, 2);
    assert_eq!(summary.attendance_updated, 0);
    assert_eq!(summary.groups_without_shift, 0);

    let state = h.store.snapshot();
    let first_day = state.attendance.iter().find(|a| a.attendance_date == day()).unwrap();
    assert_eq!(first_day.punch_in, Some(local(8, 55)));
    assert_eq!(first_day.punch_out, Some(local(18, 5)));
    assert_eq!(first_day.total_hours, Some(9.17));

    let second_day = state
        .attendance
        .iter()
        .find(|a| a.attendance_date == next_day.date())
        .unwrap();
    assert_eq!(second_day.punch_in, Some(next_day));
    assert_eq!(second_day.punch_out, None);
    assert!(state.punches[3].is_late);

    assert!(
        state.punches[..3]
            .iter()
            .all(|p| p.daily_attendance_id == Some(first_day.id))
    );
}

#[actix_web::test]
async fn reconciliation_flags_only_the_boundary_punches() {
    let h = harness();
    for at in [local(9, 20), local(13, 0), local(17, 0)] {
        h.service.push_biometric_punch(device_punch("DEV-1", at)).await.unwrap();
    }

    h.service.process_punch_logs(week()).await.unwrap();

    let punches = h.store.snapshot().punches;
    assert!(punches[0].is_late && !punches[0].is_early_out);
    assert!(!punches[1].is_late && !punches[1].is_early_out);
    assert!(punches[2].is_early_out && !punches[2].is_late);
}

#[actix_web::test]
async fn reconciliation_is_idempotent() {
    let h = harness();
    for at in [local(9, 0), local(18, 0)] {
        h.service.push_biometric_punch(device_punch("DEV-1", at)).await.unwrap();
    }

    h.service.process_punch_logs(week()).await.unwrap();
    let after_first = h.store.snapshot();

    let second = h.service.process_punch_logs(week()).await.unwrap();
    assert_eq!(second.groups_processed, 0);
    assert_eq!(second.punches_linked, 0);

    let after_second = h.store.snapshot();
    assert_eq!(after_first.attendance.len(), after_second.attendance.len());
    assert_eq!(after_second.attendance[0].punch_in, Some(local(9, 0)));
    assert_eq!(after_second.attendance[0].punch_out, Some(local(18, 0)));
    assert_eq!(after_second.attendance[0].total_hours, Some(9.0));
}

#[actix_web::test]
async fn reconciliation_failure_rolls_back_every_group() {
    let h = harness();
    h.service.push_biometric_punch(device_punch("DEV-1", local(9, 0))).await.unwrap();
    h.service.push_biometric_punch(device_punch("DEV-2", local(9, 0))).await.unwrap();
    h.store.seed(|state| state.fail_link_for_employee = Some(KOLKATA_EMPLOYEE));

    let err = h.service.process_punch_logs(week()).await.unwrap_err();
    assert!(matches!(err, AttendanceError::Database(_)));

    let state = h.store.snapshot();
    assert!(state.attendance.is_empty());
    assert!(state.punches.iter().all(|p| p.daily_attendance_id.is_none()));
    assert!(state.punches.iter().all(|p| !p.is_late));
}

#[actix_web::test]
async fn reconciliation_merges_into_interactive_day() {
    let h = harness();
    h.clock.set(utc_at(9, 0));
    let web = h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    h.service
        .push_biometric_punch(device_punch("DEV-1", local(18, 2)))
        .await
        .unwrap();

    let summary = h.service.process_punch_logs(week()).await.unwrap();
    assert_eq!(summary.attendance_updated, 1);
    assert_eq!(summary.attendance_created, 0);

    let state = h.store.snapshot();
    assert_eq!(state.attendance.len(), 1);
    assert_eq!(state.attendance[0].id, web.attendance.id);
    assert_eq!(state.attendance[0].punch_out, Some(local(18, 2)));
    assert_eq!(state.attendance[0].total_hours, Some(9.03));
}

#[actix_web::test]
async fn reconciliation_without_shift_still_aggregates() {
    let h = harness();
    h.store.seed(|state| state.employees.push(employee(4, "UTC", "DEV-4")));
    h.service.push_biometric_punch(device_punch("DEV-4", local(11, 0))).await.unwrap();

    let summary = h.service.process_punch_logs(week()).await.unwrap();
    assert_eq!(summary.groups_without_shift, 1);
    assert_eq!(summary.attendance_created, 1);
}

#[actix_web::test]
async fn reconciliation_respects_scope_and_range() {
    let h = harness();
    h.service.push_biometric_punch(device_punch("DEV-1", local(9, 0))).await.unwrap();
    h.service.push_biometric_punch(device_punch("DEV-2", local(9, 0))).await.unwrap();

    let mut filter = week();
    filter.employee_id = Some(UTC_EMPLOYEE);
    let summary = h.service.process_punch_logs(filter).await.unwrap();
    assert_eq!(summary.groups_processed, 1);

    let inverted = PunchLogFilter {
        from: day() + Duration::days(1),
        to: day(),
        company_id: None,
        employee_id: None,
    };
    let err = h.service.process_punch_logs(inverted).await.unwrap_err();
    assert!(matches!(err, AttendanceError::InvalidRange { .. }));
}

// -----------------------------------------------------------------------
// Breaks
// -----------------------------------------------------------------------

#[actix_web::test]
async fn break_requires_clock_in() {
    let h = harness();
    let err = h
        .service
        .toggle_break(UTC_EMPLOYEE, COMPANY, BreakToggle::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::ClockInRequired));
}

#[actix_web::test]
async fn break_refused_after_clock_out() {
    let h = harness();
    h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    h.clock.set(utc_at(18, 0));
    h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();

    let err = h
        .service
        .toggle_break(UTC_EMPLOYEE, COMPANY, BreakToggle::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::AlreadyClockedOut));
}

#[actix_web::test]
async fn break_toggle_starts_then_ends_the_same_break() {
    let h = harness();
    h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();

    h.clock.set(utc_at(12, 0));
    let started = h
        .service
        .toggle_break(UTC_EMPLOYEE, COMPANY, BreakToggle::default())
        .await
        .unwrap();
    assert_eq!(started.action, BreakAction::Started);
    assert_eq!(started.break_log.status, BreakStatus::Ongoing);
    assert_eq!(started.break_log.break_name, AD_HOC_BREAK);

    h.clock.set(utc_at(12, 30));
    let ended = h
        .service
        .toggle_break(UTC_EMPLOYEE, COMPANY, BreakToggle::default())
        .await
        .unwrap();
    assert_eq!(ended.action, BreakAction::Ended);
    assert_eq!(ended.break_log.id, started.break_log.id);
    assert_eq!(ended.break_log.status, BreakStatus::Completed);
    assert_eq!(ended.break_log.break_duration_minutes, Some(30));
    assert_eq!(ended.break_log.break_end_time, Some(local(12, 30)));

    h.clock.set(utc_at(15, 0));
    let again = h
        .service
        .toggle_break(UTC_EMPLOYEE, COMPANY, BreakToggle::default())
        .await
        .unwrap();
    assert_eq!(again.action, BreakAction::Started);
    assert_ne!(again.break_log.id, started.break_log.id);

    let breaks = h.store.snapshot().breaks;
    assert_eq!(breaks.iter().filter(|b| b.status == BreakStatus::Ongoing).count(), 1);
}

#[actix_web::test]
async fn configured_break_rule_is_checked_against_the_shift() {
    let h = harness();
    h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    let calls_before = h.shifts.calls();

    let err = h
        .service
        .toggle_break(
            UTC_EMPLOYEE,
            COMPANY,
            BreakToggle {
                shift_break_rule_id: Some(6),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::BreakRuleNotFound { rule_id: 6 }));

    let started = h
        .service
        .toggle_break(
            UTC_EMPLOYEE,
            COMPANY,
            BreakToggle {
                shift_break_rule_id: Some(5),
            },
        )
        .await
        .unwrap();
    assert_eq!(started.break_log.break_name, "Lunch");
    assert_eq!(started.break_log.shift_break_rule_id, Some(5));
    assert_eq!(h.shifts.calls() - calls_before, 2);
}

// -----------------------------------------------------------------------
// Today status
// -----------------------------------------------------------------------

#[actix_web::test]
async fn today_status_reflects_punches_and_breaks() {
    let h = harness();
    let before = h.service.today_status(UTC_EMPLOYEE, COMPANY).await.unwrap();
    assert_eq!(before.next_direction, PunchDirection::In);
    assert!(before.attendance.is_none());
    assert_eq!(before.within_shift_hours, Some(true));

    h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    h.clock.set(utc_at(12, 0));
    h.service
        .toggle_break(UTC_EMPLOYEE, COMPANY, BreakToggle::default())
        .await
        .unwrap();

    let status = h.service.today_status(UTC_EMPLOYEE, COMPANY).await.unwrap();
    assert_eq!(status.date, day());
    assert_eq!(status.timezone, "UTC");
    assert_eq!(status.next_direction, PunchDirection::Out);
    assert_eq!(status.punches.len(), 1);
    assert!(status.on_break);
    assert_eq!(status.total_break_minutes, 0);

    h.clock.set(utc_at(20, 0));
    let evening = h.service.today_status(UTC_EMPLOYEE, COMPANY).await.unwrap();
    assert_eq!(evening.within_shift_hours, Some(false));
}

#[actix_web::test]
async fn today_status_reads_without_locking() {
    let h = harness();
    h.service.handle_punch(web_punch(UTC_EMPLOYEE)).await.unwrap();
    let after_punch = h.store.locking_reads();
    assert!(after_punch > 0);

    for _ in 0..3 {
        h.service.today_status(UTC_EMPLOYEE, COMPANY).await.unwrap();
    }
    assert_eq!(h.store.locking_reads(), after_punch);
}
