//! Abstract document-store seams. The attendance core only ever talks to
//! these traits; the hosted store an integrator picks (or the in-memory one
//! below) is wired in at startup. Reads are expected to be read-after-write
//! consistent within one account scope.

pub mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{AttendanceRecord, AttendanceStatus, Student};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    QueryFailed(String),

    #[error("store write failed: {0}")]
    WriteFailed(String),

    #[error("document not found: {0}")]
    NotFound(String),
}

pub trait StudentStore: Clone + Send + Sync + 'static {
    /// All students under `owner_id` whose PIN equals `pin`, regardless of
    /// their active/break status.
    fn find_by_pin(
        &self,
        owner_id: &str,
        pin: &str,
    ) -> impl Future<Output = Result<Vec<Student>, StoreError>> + Send;

    fn get_by_id(
        &self,
        owner_id: &str,
        student_id: Uuid,
    ) -> impl Future<Output = Result<Student, StoreError>> + Send;

    fn insert(&self, student: Student) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn update(&self, student: Student) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Atomically add `delta` to the student's `current_count`, clamping at
    /// zero, and return the new value. Serializes concurrent check-ins for
    /// the same student at the store level.
    fn increment_count(
        &self,
        owner_id: &str,
        student_id: Uuid,
        delta: i32,
    ) -> impl Future<Output = Result<i32, StoreError>> + Send;

    /// Payment processed: `current_count = 0`, `last_payment_date = now`.
    fn reset_balance(
        &self,
        owner_id: &str,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list(&self, owner_id: &str)
    -> impl Future<Output = Result<Vec<Student>, StoreError>> + Send;

    fn remove(
        &self,
        owner_id: &str,
        student_id: Uuid,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Distinct account scopes present in the store. Only the background
    /// payment-due scan uses this; request handlers always carry an explicit
    /// scope.
    fn list_owners(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;
}

pub trait AttendanceStore: Clone + Send + Sync + 'static {
    fn create(
        &self,
        record: AttendanceRecord,
    ) -> impl Future<Output = Result<Uuid, StoreError>> + Send;

    fn get_by_id(
        &self,
        owner_id: &str,
        record_id: Uuid,
    ) -> impl Future<Output = Result<AttendanceRecord, StoreError>> + Send;

    fn update_status(
        &self,
        owner_id: &str,
        record_id: Uuid,
        status: AttendanceStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete(
        &self,
        owner_id: &str,
        record_id: Uuid,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Records with `start <= timestamp < end`, newest first.
    fn query_by_date(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<AttendanceRecord>, StoreError>> + Send;

    /// Records for one student with `start <= timestamp < end`, newest first.
    fn query_by_student(
        &self,
        owner_id: &str,
        student_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<AttendanceRecord>, StoreError>> + Send;
}
