use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee as seen by the punch core; owned by the master-data service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "company_id": 7,
        "employee_code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "timezone": "Asia/Dhaka",
        "biometric_device_id": "ZK-0042",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub company_id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    /// IANA zone name; the company default applies when absent.
    #[schema(example = "Asia/Dhaka", nullable = true)]
    pub timezone: Option<String>,

    #[schema(example = "ZK-0042", nullable = true)]
    pub biometric_device_id: Option<String>,

    #[schema(example = "active")]
    pub status: String,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// The zone punches of this employee are recorded in.
    pub fn timezone_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.timezone.as_deref() {
            Some(tz) if !tz.trim().is_empty() => tz,
            _ => fallback,
        }
    }
}
