use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Shift definition, read-only for the punch core.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ShiftConfig {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = "General")]
    pub name: String,
    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "18:00:00", value_type = String)]
    pub end_time: NaiveTime,
    #[schema(example = 120)]
    pub checkin_allowed_before_minutes: u32,
    #[schema(example = 10)]
    pub grace_time_late_minutes: u32,
    #[schema(example = 10)]
    pub grace_time_early_minutes: u32,
}

/// Where the effective shift for a day came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShiftSource {
    Roster,
    Swap,
    Rotation,
    Assignment,
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolvedShift {
    pub shift: ShiftConfig,
    pub source: ShiftSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BreakRule {
    pub id: u64,
    pub shift_id: u64,
    pub name: String,
    pub duration_minutes: u32,
    pub is_paid: bool,
}
