pub mod attendance;
pub mod events;
pub mod student;

pub use attendance::attendance_config;
pub use events::events_config;
pub use student::student_config;

use crate::middlewares::AcademyScope;
use actix_web::{HttpMessage, HttpRequest};

/// Academy scope injected by the scope middleware. Absent only if a route
/// was wired up outside the middleware by mistake.
pub(crate) fn academy_id(req: &HttpRequest) -> Option<String> {
    req.extensions().get::<AcademyScope>().map(|s| s.0.clone())
}
