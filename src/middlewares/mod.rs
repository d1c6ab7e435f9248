pub mod cors;
pub mod scope;

pub use cors::create_cors;
pub use scope::{AcademyScope, AcademyScopeMiddleware};
