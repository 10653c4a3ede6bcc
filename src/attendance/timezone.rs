//! Timezone helpers. Conversions that feed a decision fail hard on an
//! unknown zone; the display helpers degrade to an empty string instead.

use chrono::{DateTime, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use super::clock::Clock;
use super::shift_timing::TimeOfDay;
use crate::error::{AttendanceError, AttendanceResult};

pub fn parse_tz(tz: &str) -> AttendanceResult<Tz> {
    tz.trim()
        .parse::<Tz>()
        .map_err(|_| AttendanceError::InvalidTimezone(tz.to_string()))
}

pub fn is_valid_timezone(tz: &str) -> bool {
    parse_tz(tz).is_ok()
}

pub fn to_employee_timezone(utc: DateTime<Utc>, tz: &str) -> AttendanceResult<DateTime<Tz>> {
    Ok(utc.with_timezone(&parse_tz(tz)?))
}

/// Reads a device timestamp that was recorded in UTC.
pub fn utc_naive_to_employee_timezone(
    utc: NaiveDateTime,
    tz: &str,
) -> AttendanceResult<DateTime<Tz>> {
    to_employee_timezone(Utc.from_utc_datetime(&utc), tz)
}

/// Reads a wall-clock timestamp already expressed in `tz`. For a time that
/// falls in a DST gap the next valid instant is taken; for a repeated hour
/// the earlier one.
pub fn local_naive_in_timezone(local: NaiveDateTime, tz: &str) -> AttendanceResult<DateTime<Tz>> {
    let zone = parse_tz(tz)?;
    let resolved = zone
        .from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(local + chrono::Duration::hours(1)))
                .earliest()
        })
        .ok_or_else(|| AttendanceError::InvalidTimezone(tz.to_string()))?;
    Ok(resolved)
}

pub fn now_in_timezone(clock: &dyn Clock, tz: &str) -> AttendanceResult<DateTime<Tz>> {
    to_employee_timezone(clock.now(), tz)
}

/// `"+05:30"` style offset of `tz` at `at`, or an empty string for an unknown zone.
pub fn utc_offset(tz: &str, at: DateTime<Utc>) -> String {
    let Ok(zone) = parse_tz(tz) else {
        return String::new();
    };
    let seconds = zone.offset_from_utc_datetime(&at.naive_utc()).fix().local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// Formats `instant` in `tz` with a strftime pattern, or returns an empty string.
pub fn format(instant: DateTime<Utc>, tz: &str, pattern: &str) -> String {
    match parse_tz(tz) {
        Ok(zone) => instant.with_timezone(&zone).format(pattern).to_string(),
        Err(_) => String::new(),
    }
}

/// Signed whole minutes from `a` to `b`.
pub fn minutes_between(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (b - a).num_minutes()
}

/// Whether the local time of `instant` in `tz` lies in `[start, end]`,
/// wrapping past midnight when `end < start`.
pub fn is_within_time_of_day(
    instant: DateTime<Utc>,
    start: TimeOfDay,
    end: TimeOfDay,
    tz: &str,
) -> AttendanceResult<bool> {
    let local = to_employee_timezone(instant, tz)?;
    Ok(TimeOfDay::from(local.time()).is_within(start, end))
}
