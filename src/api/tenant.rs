use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorBadRequest, error::ErrorForbidden};
use futures::future::{Ready, ready};

pub const COMPANY_HEADER: &str = "X-Company-Id";
pub const EMPLOYEE_HEADER: &str = "X-Employee-Id";

/// Caller identity forwarded by the gateway in front of this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub company_id: u64,

    /// Present only when the caller is an employee
    pub employee_id: Option<u64>,
}

fn header_id(req: &HttpRequest, name: &str) -> Result<Option<u64>, actix_web::Error> {
    match req.headers().get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .map(Some)
            .ok_or_else(|| ErrorBadRequest(format!("Invalid {name} header"))),
    }
}

impl FromRequest for TenantContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let company_id = match header_id(req, COMPANY_HEADER) {
            Ok(Some(id)) => id,
            Ok(None) => return ready(Err(ErrorBadRequest(format!("Missing {COMPANY_HEADER} header")))),
            Err(e) => return ready(Err(e)),
        };

        let employee_id = match header_id(req, EMPLOYEE_HEADER) {
            Ok(id) => id,
            Err(e) => return ready(Err(e)),
        };

        ready(Ok(TenantContext {
            company_id,
            employee_id,
        }))
    }
}

impl TenantContext {
    pub fn require_employee(&self) -> actix_web::Result<u64> {
        self.employee_id
            .ok_or_else(|| ErrorForbidden("No employee profile"))
    }
}
