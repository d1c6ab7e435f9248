use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{AttendanceRecord, AttendanceStatus, Student, StudentStatus, UsageType};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::attendance::resolve_pin,
        handlers::attendance::check_in,
        handlers::attendance::mark_absence,
        handlers::attendance::update_record_status,
        handlers::attendance::delete_record,
        handlers::attendance::daily_attendance,
        handlers::attendance::history,
        handlers::student::register,
        handlers::student::list,
        handlers::student::get_student,
        handlers::student::update_student,
        handlers::student::delete_student,
        handlers::student::process_payment,
        handlers::student::payment_due,
        handlers::events::stream,
    ),
    components(
        schemas(
            Student,
            StudentStatus,
            UsageType,
            AttendanceRecord,
            AttendanceStatus,
            StudentResponse,
            RegisterStudentRequest,
            UpdateStudentRequest,
            PaymentDueStatus,
            ResolvePinRequest,
            ResolveResult,
            CheckInRequest,
            CheckInOutcome,
            RejectReason,
            AbsenceRequest,
            UpdateRecordStatusRequest,
            ApiError,
            ApiErrorBody,
        )
    ),
    tags(
        (name = "attendance", description = "PIN resolution and attendance ledger API"),
        (name = "student", description = "Student roster and billing API"),
        (name = "events", description = "Change feed (SSE)"),
    ),
    info(
        title = "WEMA Backend API",
        version = "1.0.0",
        description = "Academy attendance and billing backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
