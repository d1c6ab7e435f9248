use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::academy_id;
use crate::models::*;
use crate::{AppAttendanceLedger, AppStudentService};

fn missing_scope() -> HttpResponse {
    AppError::ValidationError("Missing academy scope".to_string()).error_response()
}

#[utoipa::path(
    post,
    path = "/students",
    tag = "student",
    request_body = RegisterStudentRequest,
    params(
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Student registered", body = StudentResponse),
        (status = 400, description = "Invalid input", body = ApiError)
    )
)]
pub async fn register(
    students: web::Data<AppStudentService>,
    req: HttpRequest,
    request: web::Json<RegisterStudentRequest>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match students.register(&owner_id, request.into_inner()).await {
        Ok(student) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": student
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/students",
    tag = "student",
    params(
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Roster with derived payment state, payment-needed first")
    )
)]
pub async fn list(
    students: web::Data<AppStudentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match students.list(&owner_id).await {
        Ok(roster) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": roster
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/students/{student_id}",
    tag = "student",
    params(
        ("student_id" = Uuid, Path, description = "Student id"),
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Student detail", body = StudentResponse),
        (status = 404, description = "Student not found", body = ApiError)
    )
)]
pub async fn get_student(
    students: web::Data<AppStudentService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match students.get(&owner_id, path.into_inner()).await {
        Ok(student) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": student
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/students/{student_id}",
    tag = "student",
    request_body = UpdateStudentRequest,
    params(
        ("student_id" = Uuid, Path, description = "Student id"),
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 404, description = "Student not found", body = ApiError)
    )
)]
pub async fn update_student(
    students: web::Data<AppStudentService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdateStudentRequest>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match students
        .update(&owner_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(student) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": student
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/students/{student_id}",
    tag = "student",
    params(
        ("student_id" = Uuid, Path, description = "Student id"),
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 404, description = "Student not found", body = ApiError)
    )
)]
pub async fn delete_student(
    students: web::Data<AppStudentService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match students.delete(&owner_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": null
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/students/{student_id}/payment",
    tag = "student",
    params(
        ("student_id" = Uuid, Path, description = "Student id"),
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Balance reset and billing anchor restamped"),
        (status = 404, description = "Student not found", body = ApiError)
    )
)]
pub async fn process_payment(
    ledger: web::Data<AppAttendanceLedger>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match ledger
        .process_payment(&owner_id, path.into_inner(), Utc::now())
        .await
    {
        Ok(student) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": student
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/students/{student_id}/payment-due",
    tag = "student",
    params(
        ("student_id" = Uuid, Path, description = "Student id"),
        ("X-Academy-Id" = String, Header, description = "Academy account scope")
    ),
    responses(
        (status = 200, description = "Freshly derived payment status", body = PaymentDueStatus),
        (status = 404, description = "Student not found", body = ApiError)
    )
)]
pub async fn payment_due(
    students: web::Data<AppStudentService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let Some(owner_id) = academy_id(&req) else {
        return Ok(missing_scope());
    };

    match students.payment_due(&owner_id, path.into_inner()).await {
        Ok(status) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": status
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn student_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students")
            .route("", web::post().to(register))
            .route("", web::get().to(list))
            .route("/{student_id}", web::get().to(get_student))
            .route("/{student_id}", web::put().to(update_student))
            .route("/{student_id}", web::delete().to(delete_student))
            .route("/{student_id}/payment", web::post().to(process_payment))
            .route("/{student_id}/payment-due", web::get().to(payment_due)),
    );
}
