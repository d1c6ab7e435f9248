//! Failure-injection coverage for the record/count compensation protocol: a
//! check-in whose count increment fails must not leave an orphan record, and
//! a deletion whose decrement fails must restore the record.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use wema_backend::entities::{AttendanceRecord, AttendanceStatus, Student, StudentStatus, UsageType};
use wema_backend::error::AppError;
use wema_backend::services::{AttendanceLedger, ChangeFeed};
use wema_backend::store::{AttendanceStore, MemoryStore, StoreError, StudentStore};

const OWNER: &str = "academy-1";

/// Delegates to a `MemoryStore` but fails selected operations on demand.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_increment: Arc<AtomicBool>,
    fail_record_delete: Arc<AtomicBool>,
}

impl FlakyStore {
    fn write_failure() -> StoreError {
        StoreError::WriteFailed("injected".to_string())
    }
}

impl StudentStore for FlakyStore {
    async fn find_by_pin(&self, owner_id: &str, pin: &str) -> Result<Vec<Student>, StoreError> {
        self.inner.find_by_pin(owner_id, pin).await
    }

    async fn get_by_id(&self, owner_id: &str, student_id: Uuid) -> Result<Student, StoreError> {
        StudentStore::get_by_id(&self.inner, owner_id, student_id).await
    }

    async fn insert(&self, student: Student) -> Result<(), StoreError> {
        self.inner.insert(student).await
    }

    async fn update(&self, student: Student) -> Result<(), StoreError> {
        self.inner.update(student).await
    }

    async fn increment_count(
        &self,
        owner_id: &str,
        student_id: Uuid,
        delta: i32,
    ) -> Result<i32, StoreError> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(Self::write_failure());
        }
        self.inner.increment_count(owner_id, student_id, delta).await
    }

    async fn reset_balance(
        &self,
        owner_id: &str,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.inner.reset_balance(owner_id, student_id, now).await
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<Student>, StoreError> {
        self.inner.list(owner_id).await
    }

    async fn remove(&self, owner_id: &str, student_id: Uuid) -> Result<(), StoreError> {
        self.inner.remove(owner_id, student_id).await
    }

    async fn list_owners(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_owners().await
    }
}

impl AttendanceStore for FlakyStore {
    async fn create(&self, record: AttendanceRecord) -> Result<Uuid, StoreError> {
        self.inner.create(record).await
    }

    async fn get_by_id(
        &self,
        owner_id: &str,
        record_id: Uuid,
    ) -> Result<AttendanceRecord, StoreError> {
        AttendanceStore::get_by_id(&self.inner, owner_id, record_id).await
    }

    async fn update_status(
        &self,
        owner_id: &str,
        record_id: Uuid,
        status: AttendanceStatus,
    ) -> Result<(), StoreError> {
        self.inner.update_status(owner_id, record_id, status).await
    }

    async fn delete(&self, owner_id: &str, record_id: Uuid) -> Result<(), StoreError> {
        if self.fail_record_delete.load(Ordering::SeqCst) {
            return Err(Self::write_failure());
        }
        self.inner.delete(owner_id, record_id).await
    }

    async fn query_by_date(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.inner.query_by_date(owner_id, start, end).await
    }

    async fn query_by_student(
        &self,
        owner_id: &str,
        student_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.inner
            .query_by_student(owner_id, student_id, start, end)
            .await
    }
}

fn session_student(total: i32, current: i32) -> Student {
    Student {
        id: Uuid::new_v4(),
        owner_id: OWNER.to_string(),
        name: "Mina".to_string(),
        contact: None,
        pin: "1234".to_string(),
        subject: "piano".to_string(),
        branch: "main".to_string(),
        usage_type: UsageType::Session,
        total_count: total,
        current_count: current,
        last_payment_date: Utc::now(),
        status: StudentStatus::Active,
        reg_date: Utc::now().date_naive(),
        created_at: Utc::now(),
    }
}

async fn record_count(store: &FlakyStore, student_id: Uuid) -> usize {
    let (start, end) = (DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC);
    store
        .query_by_student(OWNER, student_id, start, end)
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn failed_increment_rolls_record_back() {
    let store = FlakyStore::default();
    let ledger = AttendanceLedger::new(store.clone(), store.clone(), ChangeFeed::default());
    let student = session_student(8, 3);
    let id = student.id;
    store.insert(student).await.unwrap();

    store.fail_increment.store(true, Ordering::SeqCst);
    let err = ledger.check_in(OWNER, id, Utc::now()).await.unwrap_err();
    assert!(matches!(err, AppError::MutationError(_)));

    // No orphan record, count untouched.
    assert_eq!(record_count(&store, id).await, 0);
    let after = StudentStore::get_by_id(&store, OWNER, id).await.unwrap();
    assert_eq!(after.current_count, 3);

    // Clearing the fault makes the same check-in succeed.
    store.fail_increment.store(false, Ordering::SeqCst);
    ledger.check_in(OWNER, id, Utc::now()).await.unwrap();
    assert_eq!(record_count(&store, id).await, 1);
}

#[tokio::test]
async fn failed_absence_increment_rolls_record_back() {
    let store = FlakyStore::default();
    let ledger = AttendanceLedger::new(store.clone(), store.clone(), ChangeFeed::default());
    let student = session_student(8, 0);
    let id = student.id;
    store.insert(student).await.unwrap();

    store.fail_increment.store(true, Ordering::SeqCst);
    let err = ledger
        .toggle_absence(OWNER, id, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MutationError(_)));

    assert_eq!(record_count(&store, id).await, 0);
    let after = StudentStore::get_by_id(&store, OWNER, id).await.unwrap();
    assert_eq!(after.current_count, 0);
}

#[tokio::test]
async fn failed_decrement_restores_deleted_record() {
    let store = FlakyStore::default();
    let ledger = AttendanceLedger::new(store.clone(), store.clone(), ChangeFeed::default());
    let student = session_student(8, 0);
    let id = student.id;
    store.insert(student).await.unwrap();

    ledger.check_in(OWNER, id, Utc::now()).await.unwrap();
    let record = store
        .query_by_student(OWNER, id, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
        .await
        .unwrap()
        .remove(0);

    // Fail the increment path: deletion removes the record, the decrement
    // fails, and the record must come back.
    store.fail_increment.store(true, Ordering::SeqCst);
    let err = ledger.delete_record(OWNER, record.id).await.unwrap_err();
    assert!(matches!(err, AppError::MutationError(_)));

    let restored = AttendanceStore::get_by_id(&store, OWNER, record.id)
        .await
        .unwrap();
    assert_eq!(restored.status, record.status);
    assert_eq!(restored.timestamp, record.timestamp);
    let after = StudentStore::get_by_id(&store, OWNER, id).await.unwrap();
    assert_eq!(after.current_count, 1);

    // With the fault cleared, deletion completes and gives the lesson back.
    store.fail_increment.store(false, Ordering::SeqCst);
    ledger.delete_record(OWNER, record.id).await.unwrap();
    assert_eq!(record_count(&store, id).await, 0);
    let after = StudentStore::get_by_id(&store, OWNER, id).await.unwrap();
    assert_eq!(after.current_count, 0);
}

#[tokio::test]
async fn decrement_tolerates_missing_student() {
    let store = FlakyStore::default();
    let ledger = AttendanceLedger::new(store.clone(), store.clone(), ChangeFeed::default());
    let student = session_student(8, 0);
    let id = student.id;
    store.insert(student).await.unwrap();

    ledger.check_in(OWNER, id, Utc::now()).await.unwrap();
    let record = store
        .query_by_student(OWNER, id, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
        .await
        .unwrap()
        .remove(0);

    // Orphaned history after a student deletion still cleans up.
    store.remove(OWNER, id).await.unwrap();
    ledger.delete_record(OWNER, record.id).await.unwrap();
    assert_eq!(record_count(&store, id).await, 0);
}

#[tokio::test]
async fn failed_record_delete_leaves_count_alone() {
    let store = FlakyStore::default();
    let ledger = AttendanceLedger::new(store.clone(), store.clone(), ChangeFeed::default());
    let student = session_student(8, 0);
    let id = student.id;
    store.insert(student).await.unwrap();

    ledger.check_in(OWNER, id, Utc::now()).await.unwrap();
    let record = store
        .query_by_student(OWNER, id, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
        .await
        .unwrap()
        .remove(0);

    store.fail_record_delete.store(true, Ordering::SeqCst);
    let err = ledger.delete_record(OWNER, record.id).await.unwrap_err();
    assert!(matches!(err, AppError::MutationError(_)));

    // Delete never ran, so the decrement must not have either.
    assert_eq!(record_count(&store, id).await, 1);
    let after = StudentStore::get_by_id(&store, OWNER, id).await.unwrap();
    assert_eq!(after.current_count, 1);
}
