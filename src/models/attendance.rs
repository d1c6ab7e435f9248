use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{AttendanceRecord, AttendanceStatus, Student, UsageType};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResolvePinRequest {
    pub pin: String,
}

/// Result of resolving a PIN entry within one academy scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ResolveResult {
    NotFound,
    SingleMatch {
        student: Student,
    },
    /// Sibling case: two or more students share the PIN. The caller presents
    /// a selection and re-invokes check-in with the chosen student.
    Ambiguous {
        students: Vec<Student>,
    },
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckInRequest {
    pub student_id: Uuid,
    /// Logical event time of the check-in. Defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AbsenceRequest {
    pub student_id: Uuid,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateRecordStatusRequest {
    pub status: AttendanceStatus,
}

/// Business-rule rejection of a check-in. Not a failure: always reported to
/// the end user with a specific reason, never silently dropped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    StudentOnBreak,
    BalanceExhausted,
}

impl RejectReason {
    pub fn message(&self, student_name: &str) -> String {
        match self {
            RejectReason::StudentOnBreak => {
                format!("{student_name} is on break and cannot check in")
            }
            RejectReason::BalanceExhausted => {
                format!("{student_name} has no lessons remaining")
            }
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::StudentOnBreak => write!(f, "student_on_break"),
            RejectReason::BalanceExhausted => write!(f, "balance_exhausted"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckInOutcome {
    Accepted {
        record: AttendanceRecord,
        student_name: String,
        subject: String,
        usage_type: UsageType,
        /// Post-mutation remaining balance; only meaningful for session
        /// students, monthly check-ins get a plain confirmation.
        remaining: Option<i32>,
    },
    Rejected {
        reason: RejectReason,
        message: String,
    },
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DailyQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
