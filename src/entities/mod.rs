pub mod attendance_records;
pub mod students;

pub use attendance_records::*;
pub use students::*;
