//! Live-update push layered on top of the ledger, never inside it. The
//! ledger decides and mutates; this channel only tells interested UIs that
//! something changed so they can re-query. Lossy by design: a lagging
//! subscriber misses events instead of slowing writers down.

use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::AttendanceStatus;
use crate::models::PaymentDueStatus;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    CheckInAccepted {
        owner_id: String,
        student_id: Uuid,
        record_id: Uuid,
        remaining: Option<i32>,
    },
    AbsenceMarked {
        owner_id: String,
        student_id: Uuid,
        record_id: Uuid,
    },
    RecordStatusChanged {
        owner_id: String,
        record_id: Uuid,
        status: AttendanceStatus,
    },
    RecordDeleted {
        owner_id: String,
        record_id: Uuid,
        student_id: Uuid,
    },
    StudentChanged {
        owner_id: String,
        student_id: Uuid,
    },
    StudentRemoved {
        owner_id: String,
        student_id: Uuid,
    },
    PaymentProcessed {
        owner_id: String,
        student_id: Uuid,
    },
    PaymentDueReminder {
        owner_id: String,
        student_id: Uuid,
        student_name: String,
        status: PaymentDueStatus,
    },
}

impl ChangeEvent {
    /// Scope the event belongs to; subscribers only ever see their own
    /// academy's events.
    pub fn owner_id(&self) -> &str {
        match self {
            ChangeEvent::CheckInAccepted { owner_id, .. }
            | ChangeEvent::AbsenceMarked { owner_id, .. }
            | ChangeEvent::RecordStatusChanged { owner_id, .. }
            | ChangeEvent::RecordDeleted { owner_id, .. }
            | ChangeEvent::StudentChanged { owner_id, .. }
            | ChangeEvent::StudentRemoved { owner_id, .. }
            | ChangeEvent::PaymentProcessed { owner_id, .. }
            | ChangeEvent::PaymentDueReminder { owner_id, .. } => owner_id,
        }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        // No subscribers is not an error; the feed is best-effort.
        if self.tx.send(event).is_err() {
            log::debug!("change feed has no subscribers, event dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}
