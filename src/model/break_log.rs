use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

/// Label stored on breaks that are not tied to a configured rule.
pub const AD_HOC_BREAK: &str = "ad_hoc";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BreakStatus {
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct BreakLog {
    #[schema(example = 1)]
    pub id: u64,
    pub employee_id: u64,
    pub company_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub break_date: NaiveDate,
    pub shift_break_rule_id: Option<u64>,
    #[schema(example = "Lunch")]
    pub break_name: String,
    #[schema(format = "date-time", value_type = String)]
    pub break_start_time: NaiveDateTime,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub break_end_time: Option<NaiveDateTime>,
    pub break_duration_minutes: Option<i64>,
    pub status: BreakStatus,
}

#[derive(Debug, Clone)]
pub struct NewBreakLog {
    pub employee_id: u64,
    pub company_id: u64,
    pub break_date: NaiveDate,
    pub shift_break_rule_id: Option<u64>,
    pub break_name: String,
    pub break_start_time: NaiveDateTime,
}

impl NewBreakLog {
    pub fn into_break_log(self, id: u64) -> BreakLog {
        BreakLog {
            id,
            employee_id: self.employee_id,
            company_id: self.company_id,
            break_date: self.break_date,
            shift_break_rule_id: self.shift_break_rule_id,
            break_name: self.break_name,
            break_start_time: self.break_start_time,
            break_end_time: None,
            break_duration_minutes: None,
            status: BreakStatus::Ongoing,
        }
    }
}
