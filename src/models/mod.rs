pub mod attendance;
pub mod common;
pub mod pagination;
pub mod student;

pub use attendance::*;
pub use common::*;
pub use pagination::*;
pub use student::*;
