use actix_web::{HttpRequest, HttpResponse, Responder, web};

use crate::api::tenant::TenantContext;
use crate::attendance::AttendanceService;
use crate::attendance::aggregator::ReconciliationSummary;
use crate::attendance::breaks::{BreakToggle, BreakToggleOutcome};
use crate::attendance::punch::{BiometricPunch, PunchCommand, PunchOutcome};
use crate::attendance::status::TodayStatus;
use crate::model::punch::{Punch, PunchSource};
use crate::models::{BiometricPushRequest, ProcessLogsRequest, PunchRequest};
use crate::store::PunchLogFilter;

fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info().realip_remote_addr().map(str::to_string)
}

fn punch_command(
    employee_id: u64,
    company_id: u64,
    source: PunchSource,
    req: &HttpRequest,
    body: PunchRequest,
) -> PunchCommand {
    PunchCommand {
        employee_id,
        company_id,
        source,
        device_time: None,
        location: body.location(),
        device_info: body.device_info,
        ip_address: client_ip(req),
    }
}

/// Web punch for the calling employee
#[utoipa::path(
    post,
    path = "/attendance/punch/web",
    request_body(content = PunchRequest, content_type = "application/json"),
    params(
        ("X-Company-Id" = u64, Header, description = "Company of the caller"),
        ("X-Employee-Id" = u64, Header, description = "Calling employee")
    ),
    responses(
        (status = 200, description = "Punch recorded", body = PunchOutcome),
        (status = 404, description = "Employee not found or inactive", body = Object, example = json!({
            "message": "Employee not found or inactive"
        })),
        (status = 409, description = "Duplicate punch", body = Object, example = json!({
            "message": "Duplicate punch detected within 1 minute(s)"
        })),
        (status = 422, description = "Rejected by shift timing or no shift assigned"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn punch_web(
    tenant: TenantContext,
    req: HttpRequest,
    service: web::Data<AttendanceService>,
    body: web::Json<PunchRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = tenant.require_employee()?;
    let cmd = punch_command(
        employee_id,
        tenant.company_id,
        PunchSource::Web,
        &req,
        body.into_inner(),
    );
    let outcome = service.handle_punch(cmd).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Mobile punch; latitude and longitude are mandatory
#[utoipa::path(
    post,
    path = "/attendance/punch/mobile",
    request_body(content = PunchRequest, content_type = "application/json"),
    params(
        ("X-Company-Id" = u64, Header, description = "Company of the caller"),
        ("X-Employee-Id" = u64, Header, description = "Calling employee")
    ),
    responses(
        (status = 200, description = "Punch recorded", body = PunchOutcome),
        (status = 400, description = "Location missing", body = Object, example = json!({
            "message": "Location (latitude, longitude) is required for mobile punch"
        })),
        (status = 409, description = "Duplicate punch"),
        (status = 422, description = "Rejected by shift timing or no shift assigned"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn punch_mobile(
    tenant: TenantContext,
    req: HttpRequest,
    service: web::Data<AttendanceService>,
    body: web::Json<PunchRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = tenant.require_employee()?;
    let cmd = punch_command(
        employee_id,
        tenant.company_id,
        PunchSource::Mobile,
        &req,
        body.into_inner(),
    );
    let outcome = service.handle_punch(cmd).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Manual punch entered on behalf of an employee
#[utoipa::path(
    post,
    path = "/attendance/punch/admin/{employee_id}",
    request_body(content = PunchRequest, content_type = "application/json"),
    params(
        ("employee_id" = u64, Path, description = "Employee to punch for"),
        ("X-Company-Id" = u64, Header, description = "Company of the caller")
    ),
    responses(
        (status = 200, description = "Punch recorded", body = PunchOutcome),
        (status = 404, description = "Employee not found or inactive"),
        (status = 409, description = "Duplicate punch"),
        (status = 422, description = "Rejected by shift timing or no shift assigned"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn punch_admin(
    tenant: TenantContext,
    req: HttpRequest,
    path: web::Path<u64>,
    service: web::Data<AttendanceService>,
    body: web::Json<PunchRequest>,
) -> actix_web::Result<impl Responder> {
    let cmd = punch_command(
        path.into_inner(),
        tenant.company_id,
        PunchSource::Admin,
        &req,
        body.into_inner(),
    );
    let outcome = service.handle_punch(cmd).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Device push; stored for the next reconciliation run
#[utoipa::path(
    post,
    path = "/attendance/biometric/push",
    request_body(content = BiometricPushRequest, content_type = "application/json"),
    params(
        ("X-Company-Id" = u64, Header, description = "Company owning the device")
    ),
    responses(
        (status = 201, description = "Punch stored", body = Punch),
        (status = 404, description = "No active employee for this device"),
        (status = 409, description = "Duplicate punch"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Biometric"
)]
pub async fn biometric_push(
    tenant: TenantContext,
    req: HttpRequest,
    service: web::Data<AttendanceService>,
    body: web::Json<BiometricPushRequest>,
) -> actix_web::Result<impl Responder> {
    let body = body.into_inner();
    let punch = service
        .push_biometric_punch(BiometricPunch {
            company_id: tenant.company_id,
            device_id: body.device_id,
            punch_time: body.punch_time,
            device_info: body.device_info,
            ip_address: client_ip(&req),
        })
        .await?;
    Ok(HttpResponse::Created().json(punch))
}

/// Reconcile queued device punches into daily attendance
#[utoipa::path(
    post,
    path = "/attendance/process-logs",
    request_body(content = ProcessLogsRequest, content_type = "application/json"),
    params(
        ("X-Company-Id" = u64, Header, description = "Company to reconcile")
    ),
    responses(
        (status = 200, description = "Run summary", body = ReconciliationSummary),
        (status = 400, description = "from is after to", body = Object, example = json!({
            "message": "Invalid date range: 2026-02-01 is after 2026-01-01"
        })),
        (status = 500, description = "Internal server error; nothing was applied")
    ),
    tag = "Biometric"
)]
pub async fn process_logs(
    tenant: TenantContext,
    service: web::Data<AttendanceService>,
    body: web::Json<ProcessLogsRequest>,
) -> actix_web::Result<impl Responder> {
    let body = body.into_inner();
    let summary = service
        .process_punch_logs(PunchLogFilter {
            from: body.from,
            to: body.to,
            company_id: Some(tenant.company_id),
            employee_id: body.employee_id,
        })
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Start a break, or end the ongoing one
#[utoipa::path(
    post,
    path = "/attendance/break/toggle",
    request_body(content = BreakToggle, content_type = "application/json"),
    params(
        ("X-Company-Id" = u64, Header, description = "Company of the caller"),
        ("X-Employee-Id" = u64, Header, description = "Calling employee")
    ),
    responses(
        (status = 200, description = "Break started or ended", body = BreakToggleOutcome),
        (status = 400, description = "Not clocked in", body = Object, example = json!({
            "message": "Please clock in before starting a break"
        })),
        (status = 404, description = "Break rule not configured for today's shift"),
        (status = 409, description = "Already clocked out"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn toggle_break(
    tenant: TenantContext,
    service: web::Data<AttendanceService>,
    body: web::Json<BreakToggle>,
) -> actix_web::Result<impl Responder> {
    let employee_id = tenant.require_employee()?;
    let outcome = service
        .toggle_break(employee_id, tenant.company_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Today's punches, breaks and shift for the calling employee
#[utoipa::path(
    get,
    path = "/attendance/today",
    params(
        ("X-Company-Id" = u64, Header, description = "Company of the caller"),
        ("X-Employee-Id" = u64, Header, description = "Calling employee")
    ),
    responses(
        (status = 200, description = "Status of the day", body = TodayStatus),
        (status = 404, description = "Employee not found or inactive"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn today(
    tenant: TenantContext,
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = tenant.require_employee()?;
    let status = service.today_status(employee_id, tenant.company_id).await?;
    Ok(HttpResponse::Ok().json(status))
}
