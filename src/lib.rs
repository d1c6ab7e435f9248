pub mod config;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod store;
pub mod swagger;
pub mod tasks;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};

/// Concrete service types the HTTP layer binds to. The services themselves
/// stay generic over the store traits; swapping in a hosted document store
/// only touches these aliases and `main`.
pub type AppPinResolver = services::PinResolver<store::MemoryStore>;
pub type AppAttendanceLedger = services::AttendanceLedger<store::MemoryStore, store::MemoryStore>;
pub type AppStudentService = services::StudentService<store::MemoryStore>;
