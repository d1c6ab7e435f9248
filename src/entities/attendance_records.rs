use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Status of one attendance record. Distinct from `StudentStatus`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Makeup,
}

impl AttendanceStatus {
    /// The single admissible admin edit from this status. The cycle is
    /// absent -> present -> makeup; makeup is terminal (the next admin
    /// action is deletion, not another edit).
    pub fn next_in_cycle(self) -> Option<AttendanceStatus> {
        match self {
            AttendanceStatus::Absent => Some(AttendanceStatus::Present),
            AttendanceStatus::Present => Some(AttendanceStatus::Makeup),
            AttendanceStatus::Makeup => None,
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
            AttendanceStatus::Makeup => write!(f, "makeup"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub owner_id: String,
    /// Student name and subject copied at creation time so history views
    /// render without a join against a possibly-deleted student.
    pub name: String,
    pub subject: String,
    /// Logical event time of the check-in, not the wall clock of processing.
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
}
