use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use wema_backend::{
    config::Config,
    handlers,
    middlewares::{AcademyScopeMiddleware, create_cors},
    services::{AttendanceLedger, ChangeFeed, PinResolver, StudentService},
    store::MemoryStore,
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    // In-process document store; a hosted store slots in behind the same
    // traits without touching the services.
    let store = MemoryStore::new();
    let feed = ChangeFeed::default();

    let pin_resolver = PinResolver::new(store.clone());
    let attendance_ledger = AttendanceLedger::new(store.clone(), store.clone(), feed.clone());
    let student_service =
        StudentService::new(store.clone(), feed.clone(), config.attendance.clone());

    tasks::spawn_all(
        student_service.clone(),
        config.attendance.due_scan_interval_secs,
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AcademyScopeMiddleware)
            .app_data(web::Data::new(pin_resolver.clone()))
            .app_data(web::Data::new(attendance_ledger.clone()))
            .app_data(web::Data::new(student_service.clone()))
            .app_data(web::Data::new(feed.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::attendance_config)
                    .configure(handlers::student_config)
                    .configure(handlers::events_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
