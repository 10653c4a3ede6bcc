//! Classifies a punch against its shift: too early to check in, late
//! check-in, early check-out.
//!
//! Only times of day are compared, never dates. Every time is placed on a 24h
//! frame. When neither the shift nor its check-in window crosses midnight the
//! frame starts at 00:00, so times compare as they read: a 09:00-18:00 shift
//! with 120 minutes early check-in rejects any IN before 07:00, including
//! 00:10. Otherwise the frame starts in the middle of the off-duty gap
//! (between shift end and the earliest allowed check-in): an overnight shift
//! 22:00-06:00 with the same window gets a frame starting at 13:00.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::model::punch::PunchDirection;
use crate::model::shift::ShiftConfig;

const SECONDS_PER_DAY: u32 = 86_400;

/// Second-resolution time of day with wrap-around arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(Self::from)
    }

    pub fn seconds(self) -> u32 {
        self.0
    }

    pub fn add_seconds(self, seconds: i64) -> Self {
        let day = i64::from(SECONDS_PER_DAY);
        Self((i64::from(self.0) + seconds).rem_euclid(day) as u32)
    }

    pub fn add_minutes(self, minutes: i64) -> Self {
        self.add_seconds(minutes * 60)
    }

    /// Seconds to move forward from `self` to reach `later`, in `[0, 86400)`.
    pub fn seconds_until(self, later: TimeOfDay) -> u32 {
        (later.0 + SECONDS_PER_DAY - self.0) % SECONDS_PER_DAY
    }

    /// Inclusive range check; `end < start` means the range wraps midnight.
    pub fn is_within(self, start: TimeOfDay, end: TimeOfDay) -> bool {
        if start <= end {
            start <= self && self <= end
        } else {
            self >= start || self <= end
        }
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        Self(t.num_seconds_from_midnight())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            (self.0 / 60) % 60,
            self.0 % 60
        )
    }
}

impl FromStr for TimeOfDay {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map(Self::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimingEvaluation {
    pub allowed: bool,
    pub is_late: bool,
    pub is_early: bool,
    pub reason: String,
}

/// Shift boundaries laid out on the frame described in the module docs.
struct ShiftFrame {
    anchor: TimeOfDay,
    earliest: i64,
    start: i64,
    end: i64,
}

impl ShiftFrame {
    fn new(shift: &ShiftConfig) -> Self {
        let start = TimeOfDay::from(shift.start_time);
        let end = TimeOfDay::from(shift.end_time);

        let shift_len = match start.seconds_until(end) {
            0 => SECONDS_PER_DAY,
            len => len,
        };
        let off_duty = SECONDS_PER_DAY - shift_len;
        let before = (shift.checkin_allowed_before_minutes * 60).min(off_duty);

        let crosses_midnight = end <= start || before > start.seconds();
        let anchor = if crosses_midnight {
            let earliest = start.add_seconds(-i64::from(before));
            let gap = end.seconds_until(earliest);
            end.add_seconds(i64::from(gap / 2))
        } else {
            TimeOfDay(0)
        };

        let start_pos = i64::from(anchor.seconds_until(start));
        Self {
            anchor,
            earliest: start_pos - i64::from(before),
            start: start_pos,
            end: start_pos + i64::from(shift_len),
        }
    }

    fn position(&self, t: TimeOfDay) -> i64 {
        i64::from(self.anchor.seconds_until(t))
    }
}

/// Classifies a punch taken at local time `punch` against `shift`.
///
/// IN punches before the check-in window are rejected; OUT punches are
/// always accepted and only flagged.
pub fn evaluate_punch(
    punch: TimeOfDay,
    direction: PunchDirection,
    shift: &ShiftConfig,
) -> TimingEvaluation {
    let frame = ShiftFrame::new(shift);
    let at = frame.position(punch);

    match direction {
        PunchDirection::In => {
            if at < frame.earliest {
                let earliest = TimeOfDay::from(shift.start_time)
                    .add_minutes(-i64::from(shift.checkin_allowed_before_minutes));
                return TimingEvaluation {
                    allowed: false,
                    is_late: false,
                    is_early: false,
                    reason: format!(
                        "Check-in is not allowed before {} (shift starts at {})",
                        earliest,
                        TimeOfDay::from(shift.start_time)
                    ),
                };
            }

            let is_late = at > frame.start + i64::from(shift.grace_time_late_minutes) * 60;
            TimingEvaluation {
                allowed: true,
                is_late,
                is_early: false,
                reason: if is_late { "Late check-in" } else { "On time" }.to_string(),
            }
        }
        PunchDirection::Out => {
            let is_early = at < frame.end - i64::from(shift.grace_time_early_minutes) * 60;
            TimingEvaluation {
                allowed: true,
                is_late: false,
                is_early,
                reason: if is_early { "Early check-out" } else { "On time" }.to_string(),
            }
        }
    }
}
