//! Default in-process store backing the binary and the test suites. One
//! `RwLock` over both collections keeps `increment_count` atomic with
//! respect to every other mutation, which is the serialization guarantee the
//! ledger contract assumes from the real document store.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AttendanceStore, StoreError, StudentStore};
use crate::entities::{AttendanceRecord, AttendanceStatus, Student};

#[derive(Default)]
struct MemoryInner {
    students: HashMap<Uuid, Student>,
    records: HashMap<Uuid, AttendanceRecord>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StudentStore for MemoryStore {
    async fn find_by_pin(&self, owner_id: &str, pin: &str) -> Result<Vec<Student>, StoreError> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Student> = inner
            .students
            .values()
            .filter(|s| s.owner_id == owner_id && s.pin == pin)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    async fn get_by_id(&self, owner_id: &str, student_id: Uuid) -> Result<Student, StoreError> {
        let inner = self.inner.read().await;
        inner
            .students
            .get(&student_id)
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("student {student_id}")))
    }

    async fn insert(&self, student: Student) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.students.insert(student.id, student);
        Ok(())
    }

    async fn update(&self, student: Student) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.students.get(&student.id) {
            Some(existing) if existing.owner_id == student.owner_id => {
                inner.students.insert(student.id, student);
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("student {}", student.id))),
        }
    }

    async fn increment_count(
        &self,
        owner_id: &str,
        student_id: Uuid,
        delta: i32,
    ) -> Result<i32, StoreError> {
        let mut inner = self.inner.write().await;
        let student = inner
            .students
            .get_mut(&student_id)
            .filter(|s| s.owner_id == owner_id)
            .ok_or_else(|| StoreError::NotFound(format!("student {student_id}")))?;
        student.current_count = (student.current_count + delta).max(0);
        Ok(student.current_count)
    }

    async fn reset_balance(
        &self,
        owner_id: &str,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let student = inner
            .students
            .get_mut(&student_id)
            .filter(|s| s.owner_id == owner_id)
            .ok_or_else(|| StoreError::NotFound(format!("student {student_id}")))?;
        student.current_count = 0;
        student.last_payment_date = now;
        Ok(())
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<Student>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .students
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn remove(&self, owner_id: &str, student_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.students.get(&student_id) {
            Some(existing) if existing.owner_id == owner_id => {
                inner.students.remove(&student_id);
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("student {student_id}"))),
        }
    }

    async fn list_owners(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        let mut owners: Vec<String> = inner
            .students
            .values()
            .map(|s| s.owner_id.clone())
            .collect();
        owners.sort();
        owners.dedup();
        Ok(owners)
    }
}

impl AttendanceStore for MemoryStore {
    async fn create(&self, record: AttendanceRecord) -> Result<Uuid, StoreError> {
        let mut inner = self.inner.write().await;
        let id = record.id;
        inner.records.insert(id, record);
        Ok(id)
    }

    async fn get_by_id(
        &self,
        owner_id: &str,
        record_id: Uuid,
    ) -> Result<AttendanceRecord, StoreError> {
        let inner = self.inner.read().await;
        inner
            .records
            .get(&record_id)
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("attendance record {record_id}")))
    }

    async fn update_status(
        &self,
        owner_id: &str,
        record_id: Uuid,
        status: AttendanceStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(&record_id)
            .filter(|r| r.owner_id == owner_id)
            .ok_or_else(|| StoreError::NotFound(format!("attendance record {record_id}")))?;
        record.status = status;
        Ok(())
    }

    async fn delete(&self, owner_id: &str, record_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.records.get(&record_id) {
            Some(existing) if existing.owner_id == owner_id => {
                inner.records.remove(&record_id);
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!(
                "attendance record {record_id}"
            ))),
        }
    }

    async fn query_by_date(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut records: Vec<AttendanceRecord> = inner
            .records
            .values()
            .filter(|r| r.owner_id == owner_id && r.timestamp >= start && r.timestamp < end)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    async fn query_by_student(
        &self,
        owner_id: &str,
        student_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut records: Vec<AttendanceRecord> = inner
            .records
            .values()
            .filter(|r| {
                r.owner_id == owner_id
                    && r.student_id == student_id
                    && r.timestamp >= start
                    && r.timestamp < end
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }
}
