use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{Student, StudentStatus, UsageType};

/// Derived payment indicator. Never stored; recomputed on every read because
/// `current_count` and `last_payment_date` can change underneath any cached
/// copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentDueStatus {
    // Monthly cycle.
    Overdue { days_past: i64 },
    DueToday,
    DueTomorrow,
    Scheduled { next_due: NaiveDate },
    // Session allotment.
    Exhausted,
    Imminent { remaining: i32 },
    Normal { remaining: i32 },
}

impl PaymentDueStatus {
    /// Whether the student should surface in the "payment needed" list.
    pub fn needs_payment(&self) -> bool {
        matches!(
            self,
            PaymentDueStatus::Overdue { .. }
                | PaymentDueStatus::DueToday
                | PaymentDueStatus::DueTomorrow
                | PaymentDueStatus::Exhausted
                | PaymentDueStatus::Imminent { .. }
        )
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterStudentRequest {
    pub name: String,
    pub contact: Option<String>,
    /// Explicit 4-digit PIN; when omitted it is derived from the last 4
    /// digits of `contact`.
    pub pin: Option<String>,
    pub subject: String,
    pub branch: Option<String>,
    pub usage_type: Option<UsageType>,
    pub total_count: Option<i32>,
    pub reg_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub pin: Option<String>,
    pub subject: Option<String>,
    pub branch: Option<String>,
    pub usage_type: Option<UsageType>,
    pub total_count: Option<i32>,
    pub current_count: Option<i32>,
    pub status: Option<StudentStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub pin: String,
    pub subject: String,
    pub branch: String,
    pub usage_type: UsageType,
    pub total_count: i32,
    pub current_count: i32,
    pub remaining: i32,
    pub status: StudentStatus,
    pub last_payment_date: DateTime<Utc>,
    pub reg_date: NaiveDate,
    pub payment_due: PaymentDueStatus,
}

impl StudentResponse {
    pub fn new(student: Student, payment_due: PaymentDueStatus) -> Self {
        Self {
            id: student.id,
            remaining: student.remaining(),
            name: student.name,
            contact: student.contact,
            pin: student.pin,
            subject: student.subject,
            branch: student.branch,
            usage_type: student.usage_type,
            total_count: student.total_count,
            current_count: student.current_count,
            status: student.status,
            last_payment_date: student.last_payment_date,
            reg_date: student.reg_date,
            payment_due,
        }
    }
}
