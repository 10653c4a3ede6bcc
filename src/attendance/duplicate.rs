use chrono::{Duration, NaiveDateTime};

use crate::error::AttendanceResult;
use crate::store::UnitOfWork;

/// True when the employee already has a valid punch within
/// `window_minutes` either side of `instant`.
pub async fn is_duplicate(
    uow: &mut dyn UnitOfWork,
    employee_id: u64,
    instant: NaiveDateTime,
    window_minutes: i64,
) -> AttendanceResult<bool> {
    let window = Duration::minutes(window_minutes.max(0));
    uow.has_valid_punch_between(employee_id, instant - window, instant + window)
        .await
}
