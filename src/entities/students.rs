use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Billing model the student is enrolled under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    /// Fixed lesson allotment, consumed one check-in at a time.
    Session,
    /// Recurring monthly cycle anchored on the last payment date. Visit
    /// counts are still tracked but never gate check-ins.
    Monthly,
}

impl std::fmt::Display for UsageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsageType::Session => write!(f, "session"),
            UsageType::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    Active,
    /// On break: the student keeps their balance but cannot accrue new
    /// attendance until reactivated.
    Break,
}

impl std::fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudentStatus::Active => write!(f, "active"),
            StudentStatus::Break => write!(f, "break"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Student {
    pub id: Uuid,
    /// Academy account that owns this student. Every query and mutation is
    /// scoped by it; nothing in the system reads an ambient current-user.
    pub owner_id: String,
    pub name: String,
    pub contact: Option<String>,
    /// 4-digit check-in code. Unique per account in practice, but siblings
    /// registered off a shared phone number may collide; resolution handles
    /// the ambiguity instead of registration rejecting it.
    pub pin: String,
    pub subject: String,
    pub branch: String,
    pub usage_type: UsageType,
    pub total_count: i32,
    pub current_count: i32,
    /// Billing cycle anchor. Registration stamps it so brand-new students
    /// show a payment date immediately.
    pub last_payment_date: DateTime<Utc>,
    pub status: StudentStatus,
    pub reg_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Lessons left on a session allotment. Meaningful for monthly students
    /// only as a visit statistic.
    pub fn remaining(&self) -> i32 {
        self.total_count - self.current_count
    }
}
