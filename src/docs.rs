use crate::attendance::aggregator::ReconciliationSummary;
use crate::attendance::breaks::{BreakAction, BreakToggle, BreakToggleOutcome};
use crate::attendance::punch::{GeoLocation, PunchOutcome};
use crate::attendance::shift_timing::TimingEvaluation;
use crate::attendance::status::TodayStatus;
use crate::model::break_log::{BreakLog, BreakStatus};
use crate::model::daily_attendance::{AttendanceStatus, DailyAttendance};
use crate::model::employee::Employee;
use crate::model::punch::{Punch, PunchDirection, PunchSource};
use crate::model::shift::{ResolvedShift, ShiftConfig, ShiftSource};
use crate::models::{BiometricPushRequest, ProcessLogsRequest, PunchRequest};
use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiDocument;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance punch processing

Records employee punches from web, mobile, admin and biometric sources and
turns them into daily attendance records.

### 🔹 Key Features
- **Interactive punches**
  - IN/OUT inferred from the day's record, shift window and grace checks, duplicate suppression
- **Biometric devices**
  - Push endpoint appends to the punch ledger; `process-logs` reconciles it into daily records
- **Breaks**
  - Toggle start/end of ad-hoc or configured breaks
- **Today**
  - Punches, breaks and shift of the current day in the employee's timezone

### 🔐 Tenancy
Every request carries `X-Company-Id`; employee endpoints also carry
`X-Employee-Id`. Both are set by the gateway in front of this service.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::punch_web,
        crate::api::attendance::punch_mobile,
        crate::api::attendance::punch_admin,
        crate::api::attendance::toggle_break,
        crate::api::attendance::today,

        crate::api::attendance::biometric_push,
        crate::api::attendance::process_logs
    ),
    components(
        schemas(
            PunchRequest,
            BiometricPushRequest,
            ProcessLogsRequest,
            BreakToggle,
            PunchOutcome,
            BreakToggleOutcome,
            BreakAction,
            ReconciliationSummary,
            TodayStatus,
            TimingEvaluation,
            GeoLocation,
            Punch,
            PunchSource,
            PunchDirection,
            DailyAttendance,
            AttendanceStatus,
            BreakLog,
            BreakStatus,
            ResolvedShift,
            ShiftConfig,
            ShiftSource,
            Employee
        )
    ),
    tags(
        (name = "Attendance", description = "Punch and break APIs"),
        (name = "Biometric", description = "Device push and reconciliation APIs"),
    )
)]
pub struct ApiDoc;

/// The document with every path mounted under `prefix` (`API_PREFIX`).
pub fn openapi_with_prefix(prefix: &str) -> OpenApiDocument {
    let mut doc = ApiDoc::openapi();
    let prefix = prefix.trim_end_matches('/');
    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| (format!("{prefix}{path}"), item))
        .collect();
    doc
}
