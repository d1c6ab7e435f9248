use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::academy_id;
use crate::models::*;
use crate::{AppAttendanceLedger, AppPinResolver};

fn missing_scope() -> HttpResponse {
    AppError::ValidationError("Missing academy scope".to_string()).error_response()
}

#[utoipa::path(
    post,
    path = "/attendance/resolve",
    tag = "attendance",
    request_body = ResolvePinRequest,
    params(
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "PIN resolved", body = ResolveResult),
        (status = 400, description = "Malformed PIN", body = ApiError)
    )
)]
pub async fn resolve_pin(
    resolver: web::Data<AppPinResolver>,
    req: HttpRequest,
    request: web::Json<ResolvePinRequest>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match resolver.resolve(&owner_id, &request.pin).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/attendance/check-in",
    tag = "attendance",
    request_body = CheckInRequest,
    params(
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Check-in outcome (accepted or rejected)", body = CheckInOutcome),
        (status = 404, description = "Student not found", body = ApiError)
    )
)]
pub async fn check_in(
    ledger: web::Data<AppAttendanceLedger>,
    req: HttpRequest,
    request: web::Json<CheckInRequest>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };
    let request = request.into_inner();
    let now = request.timestamp.unwrap_or_else(Utc::now);

    match ledger.check_in(&owner_id, request.student_id, now).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": outcome
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/attendance/absence",
    tag = "attendance",
    request_body = AbsenceRequest,
    params(
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Absence recorded", body = AttendanceRecord),
        (status = 404, description = "Student not found", body = ApiError)
    )
)]
pub async fn mark_absence(
    ledger: web::Data<AppAttendanceLedger>,
    req: HttpRequest,
    request: web::Json<AbsenceRequest>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };
    let request = request.into_inner();
    let now = request.timestamp.unwrap_or_else(Utc::now);

    match ledger
        .toggle_absence(&owner_id, request.student_id, now)
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": record
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/attendance/records/{record_id}/status",
    tag = "attendance",
    request_body = UpdateRecordStatusRequest,
    params(
        ("record_id" = Uuid, Path, description = "Attendance record id"),
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Status updated", body = AttendanceRecord),
        (status = 400, description = "Transition not in the cycle", body = ApiError),
        (status = 404, description = "Record not found", body = ApiError)
    )
)]
pub async fn update_record_status(
    ledger: web::Data<AppAttendanceLedger>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdateRecordStatusRequest>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match ledger
        .edit_record_status(&owner_id, path.into_inner(), request.status)
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": record
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/attendance/records/{record_id}",
    tag = "attendance",
    params(
        ("record_id" = Uuid, Path, description = "Attendance record id"),
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Record deleted and balance restored"),
        (status = 404, description = "Record not found", body = ApiError)
    )
)]
pub async fn delete_record(
    ledger: web::Data<AppAttendanceLedger>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match ledger.delete_record(&owner_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": null
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/attendance/daily",
    tag = "attendance",
    params(
        ("date" = NaiveDate, Query, description = "Calendar day (YYYY-MM-DD)"),
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Records for the day, newest first")
    )
)]
pub async fn daily_attendance(
    ledger: web::Data<AppAttendanceLedger>,
    req: HttpRequest,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match ledger.daily_attendance(&owner_id, query.date).await {
        Ok(records) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": records
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/attendance/history/{student_id}",
    tag = "attendance",
    params(
        ("student_id" = Uuid, Path, description = "Student id"),
        ("from" = Option<NaiveDate>, Query, description = "Range start (inclusive)"),
        ("to" = Option<NaiveDate>, Query, description = "Range end (inclusive)"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Paginated history for the student")
    )
)]
pub async fn history(
    ledger: web::Data<AppAttendanceLedger>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };
    let query = query.into_inner();
    let params = PaginationParams::new(query.page, query.per_page);

    match ledger
        .history(&owner_id, path.into_inner(), query.from, query.to, &params)
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn attendance_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .route("/resolve", web::post().to(resolve_pin))
            .route("/check-in", web::post().to(check_in))
            .route("/absence", web::post().to(mark_absence))
            .route(
                "/records/{record_id}/status",
                web::put().to(update_record_status),
            )
            .route("/records/{record_id}", web::delete().to(delete_record))
            .route("/daily", web::get().to(daily_attendance))
            .route("/history/{student_id}", web::get().to(history)),
    );
}
