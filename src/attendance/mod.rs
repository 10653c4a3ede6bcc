//! Punch processing: IN/OUT inference, shift timing classification,
//! duplicate gating, daily aggregation and break tracking.

pub mod aggregator;
pub mod breaks;
pub mod clock;
pub mod duplicate;
pub mod punch;
pub mod shift_timing;
pub mod status;
pub mod timezone;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::config::Config;
use crate::shift_resolver::ShiftResolver;
use crate::store::AttendanceStore;
use clock::Clock;

#[derive(Debug, Clone)]
pub struct AttendanceSettings {
    /// Half-width of the duplicate window around a new punch.
    pub duplicate_window_minutes: i64,
    /// Zone used for employees without one.
    pub default_timezone: String,
}

impl From<&Config> for AttendanceSettings {
    fn from(config: &Config) -> Self {
        Self {
            duplicate_window_minutes: config.duplicate_punch_window_minutes,
            default_timezone: config.default_timezone.clone(),
        }
    }
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            duplicate_window_minutes: 1,
            default_timezone: "UTC".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    shifts: Arc<dyn ShiftResolver>,
    clock: Arc<dyn Clock>,
    settings: Arc<AttendanceSettings>,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        shifts: Arc<dyn ShiftResolver>,
        clock: Arc<dyn Clock>,
        settings: AttendanceSettings,
    ) -> Self {
        Self {
            store,
            shifts,
            clock,
            settings: Arc::new(settings),
        }
    }
}
