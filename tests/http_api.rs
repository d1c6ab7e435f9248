use actix_web::{App, test, web};
use serde_json::{Value, json};

use wema_backend::config::AttendanceConfig;
use wema_backend::handlers;
use wema_backend::middlewares::AcademyScopeMiddleware;
use wema_backend::services::{AttendanceLedger, ChangeFeed, PinResolver, StudentService};
use wema_backend::store::MemoryStore;

const SCOPE: (&str, &str) = ("X-Academy-Id", "academy-1");

macro_rules! build_app {
    () => {{
        let store = MemoryStore::new();
        let feed = ChangeFeed::default();
        test::init_service(
            App::new()
                .wrap(AcademyScopeMiddleware)
                .app_data(web::Data::new(PinResolver::new(store.clone())))
                .app_data(web::Data::new(AttendanceLedger::new(
                    store.clone(),
                    store.clone(),
                    feed.clone(),
                )))
                .app_data(web::Data::new(StudentService::new(
                    store.clone(),
                    feed.clone(),
                    AttendanceConfig::default(),
                )))
                .app_data(web::Data::new(feed))
                .service(
                    web::scope("/api/v1")
                        .configure(handlers::attendance_config)
                        .configure(handlers::student_config)
                        .configure(handlers::events_config),
                ),
        )
        .await
    }};
}

macro_rules! register_student {
    ($app:expr, $name:expr, $pin:expr, $total:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/students")
            .insert_header(SCOPE)
            .set_json(json!({
                "name": $name,
                "pin": $pin,
                "subject": "piano",
                "total_count": $total
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        assert_eq!(body["success"], json!(true));
        body["data"]["id"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn missing_scope_header_is_rejected() {
    let app = build_app!();

    // The scope middleware fails the request before routing; the error
    // surfaces as the standard envelope with a 400.
    let req = test::TestRequest::get().uri("/api/v1/students").to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    let resp = err.error_response();
    assert_eq!(resp.status(), 400);

    let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
}

#[actix_web::test]
async fn check_in_flow_over_http() {
    let app = build_app!();
    let student_id = register_student!(app, "Mina", "1234", 2);

    // Resolve the PIN at the kiosk.
    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/resolve")
        .insert_header(SCOPE)
        .set_json(json!({ "pin": "1234" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["result"], json!("single_match"));
    assert_eq!(body["data"]["student"]["id"].as_str().unwrap(), student_id);

    // Two lessons on the allotment: first check-in leaves one remaining.
    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(SCOPE)
        .set_json(json!({ "student_id": student_id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["outcome"], json!("accepted"));
    assert_eq!(body["data"]["remaining"], json!(1));

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(SCOPE)
        .set_json(json!({ "student_id": student_id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["remaining"], json!(0));

    // Exhausted now: still HTTP 200, rejection is a business outcome.
    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(SCOPE)
        .set_json(json!({ "student_id": student_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["outcome"], json!("rejected"));
    assert_eq!(body["data"]["reason"], json!("balance_exhausted"));

    // Payment resets the cycle and reopens check-in.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/students/{student_id}/payment"))
        .insert_header(SCOPE)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["current_count"], json!(0));

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(SCOPE)
        .set_json(json!({ "student_id": student_id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["outcome"], json!("accepted"));
}

#[actix_web::test]
async fn unknown_student_returns_not_found() {
    let app = build_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/students/00000000-0000-0000-0000-000000000000")
        .insert_header(SCOPE)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}

#[actix_web::test]
async fn invalid_status_transition_is_400() {
    let app = build_app!();
    let student_id = register_student!(app, "Mina", "1234", 8);

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/absence")
        .insert_header(SCOPE)
        .set_json(json!({ "student_id": student_id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let record_id = body["data"]["id"].as_str().unwrap().to_string();

    // absent -> makeup skips a step in the cycle.
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/attendance/records/{record_id}/status"))
        .insert_header(SCOPE)
        .set_json(json!({ "status": "makeup" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // absent -> present is the admissible next step.
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/attendance/records/{record_id}/status"))
        .insert_header(SCOPE)
        .set_json(json!({ "status": "present" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], json!("present"));
}

#[actix_web::test]
async fn scopes_do_not_leak_between_academies() {
    let app = build_app!();
    register_student!(app, "Mina", "1234", 8);

    let req = test::TestRequest::get()
        .uri("/api/v1/students")
        .insert_header(("X-Academy-Id", "academy-2"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::get()
        .uri("/api/v1/students")
        .insert_header(SCOPE)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn query_scope_only_accepted_on_events() {
    let app = build_app!();

    // EventSource cannot set headers, so the events route takes the scope
    // from the query string.
    let req = test::TestRequest::get()
        .uri("/api/v1/events?academy=academy-1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    // Everywhere else the header is mandatory; the query parameter is not a
    // substitute.
    let req = test::TestRequest::get()
        .uri("/api/v1/students?academy=academy-1")
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.error_response().status(), 400);
}

#[actix_web::test]
async fn registration_validation_errors() {
    let app = build_app!();

    // Malformed PIN.
    let req = test::TestRequest::post()
        .uri("/api/v1/students")
        .insert_header(SCOPE)
        .set_json(json!({
            "name": "Mina",
            "pin": "12a4",
            "subject": "piano",
            "total_count": 8
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Session students need a lesson allotment.
    let req = test::TestRequest::post()
        .uri("/api/v1/students")
        .insert_header(SCOPE)
        .set_json(json!({
            "name": "Mina",
            "pin": "1234",
            "subject": "piano"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
