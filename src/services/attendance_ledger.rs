use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::entities::{AttendanceRecord, AttendanceStatus, Student, StudentStatus, UsageType};
use crate::error::{AppError, AppResult};
use crate::models::{CheckInOutcome, PaginatedResponse, PaginationParams, PaymentDueStatus, RejectReason};
use crate::services::{ChangeEvent, ChangeFeed, lookup_error, mutation_error};
use crate::store::{AttendanceStore, StudentStore};
use crate::utils::dates::{day_bounds, days_between, one_month_after};

/// Decides whether a check-in is accepted, applies the balance mutation, and
/// emits the record for history. Record emission and count mutation are one
/// logical transaction: a failed increment rolls the record back, a failed
/// delete-side decrement restores the record.
#[derive(Clone)]
pub struct AttendanceLedger<S: StudentStore, A: AttendanceStore> {
    students: S,
    attendance: A,
    feed: ChangeFeed,
}

/// Recompute the derived payment indicator. Pure; callers must re-invoke on
/// every read because the inputs change underneath.
pub fn compute_payment_due(
    student: &Student,
    today: NaiveDate,
    imminent_threshold: i32,
) -> PaymentDueStatus {
    match student.usage_type {
        UsageType::Session => {
            let remaining = student.remaining();
            if remaining <= 0 {
                PaymentDueStatus::Exhausted
            } else if remaining <= imminent_threshold {
                PaymentDueStatus::Imminent { remaining }
            } else {
                PaymentDueStatus::Normal { remaining }
            }
        }
        UsageType::Monthly => {
            let next_due = one_month_after(student.last_payment_date.date_naive());
            let days_remaining = days_between(today, next_due);
            if days_remaining < 0 {
                PaymentDueStatus::Overdue {
                    days_past: -days_remaining,
                }
            } else if days_remaining == 0 {
                PaymentDueStatus::DueToday
            } else if days_remaining == 1 {
                PaymentDueStatus::DueTomorrow
            } else {
                PaymentDueStatus::Scheduled { next_due }
            }
        }
    }
}

impl<S: StudentStore, A: AttendanceStore> AttendanceLedger<S, A> {
    pub fn new(students: S, attendance: A, feed: ChangeFeed) -> Self {
        Self {
            students,
            attendance,
            feed,
        }
    }

    /// Ordered decision sequence, first match wins: break rejects before an
    /// exhausted balance does, and monthly students never gate on counts.
    pub async fn check_in(
        &self,
        owner_id: &str,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<CheckInOutcome> {
        let student = self
            .students
            .get_by_id(owner_id, student_id)
            .await
            .map_err(lookup_error)?;

        if student.status == StudentStatus::Break {
            log::info!("check-in rejected, {} is on break", student.id);
            return Ok(rejection(RejectReason::StudentOnBreak, &student));
        }

        if student.usage_type == UsageType::Session
            && student.current_count >= student.total_count
        {
            log::info!("check-in rejected, {} has exhausted balance", student.id);
            return Ok(rejection(RejectReason::BalanceExhausted, &student));
        }

        let (record, new_count) = self
            .create_counted_record(&student, now, AttendanceStatus::Present)
            .await?;

        let remaining = match student.usage_type {
            UsageType::Session => Some(student.total_count - new_count),
            UsageType::Monthly => None,
        };

        self.feed.publish(ChangeEvent::CheckInAccepted {
            owner_id: owner_id.to_string(),
            student_id: student.id,
            record_id: record.id,
            remaining,
        });
        log::info!(
            "check-in accepted for {} ({}), remaining {:?}",
            student.name,
            student.subject,
            remaining
        );

        Ok(CheckInOutcome::Accepted {
            record,
            student_name: student.name,
            subject: student.subject,
            usage_type: student.usage_type,
            remaining,
        })
    }

    /// Admin marks an empty calendar cell as a no-show. Absences consume
    /// balance exactly like attendance in this domain; see DESIGN.md before
    /// "fixing" this.
    pub async fn toggle_absence(
        &self,
        owner_id: &str,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<AttendanceRecord> {
        let student = self
            .students
            .get_by_id(owner_id, student_id)
            .await
            .map_err(lookup_error)?;

        let (record, _) = self
            .create_counted_record(&student, now, AttendanceStatus::Absent)
            .await?;

        self.feed.publish(ChangeEvent::AbsenceMarked {
            owner_id: owner_id.to_string(),
            student_id: student.id,
            record_id: record.id,
        });

        Ok(record)
    }

    /// Admin-only status edit, constrained to the absent -> present ->
    /// makeup cycle. Never touches the balance: count mutation happens only
    /// at record creation and deletion.
    pub async fn edit_record_status(
        &self,
        owner_id: &str,
        record_id: Uuid,
        new_status: AttendanceStatus,
    ) -> AppResult<AttendanceRecord> {
        let mut record = self
            .attendance
            .get_by_id(owner_id, record_id)
            .await
            .map_err(lookup_error)?;

        if record.status.next_in_cycle() != Some(new_status) {
            return Err(AppError::ValidationError(format!(
                "invalid status transition {} -> {new_status}",
                record.status
            )));
        }

        self.attendance
            .update_status(owner_id, record_id, new_status)
            .await
            .map_err(mutation_error)?;
        record.status = new_status;

        self.feed.publish(ChangeEvent::RecordStatusChanged {
            owner_id: owner_id.to_string(),
            record_id,
            status: new_status,
        });

        Ok(record)
    }

    /// The only reversal path: removes the record and gives the lesson back.
    pub async fn delete_record(&self, owner_id: &str, record_id: Uuid) -> AppResult<()> {
        let record = self
            .attendance
            .get_by_id(owner_id, record_id)
            .await
            .map_err(lookup_error)?;

        self.attendance
            .delete(owner_id, record_id)
            .await
            .map_err(mutation_error)?;

        match self
            .students
            .increment_count(owner_id, record.student_id, -1)
            .await
        {
            Ok(_) => {}
            Err(crate::store::StoreError::NotFound(_)) => {
                // Student already deleted; nothing left to adjust.
                log::warn!(
                    "deleted record {record_id} for missing student {}",
                    record.student_id
                );
            }
            Err(e) => {
                // Restore the record so count and history stay consistent.
                if let Err(restore_err) = self.attendance.create(record.clone()).await {
                    log::error!("failed to restore record {record_id}: {restore_err}");
                }
                return Err(mutation_error(e));
            }
        }

        self.feed.publish(ChangeEvent::RecordDeleted {
            owner_id: owner_id.to_string(),
            record_id,
            student_id: record.student_id,
        });

        Ok(())
    }

    /// Payment processed: zero the consumed count and restamp the cycle
    /// anchor. Session mode restarts its counting cycle, monthly mode gets a
    /// new due-date anchor.
    pub async fn process_payment(
        &self,
        owner_id: &str,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Student> {
        self.students
            .reset_balance(owner_id, student_id, now)
            .await
            .map_err(mutation_error)?;

        let student = self
            .students
            .get_by_id(owner_id, student_id)
            .await
            .map_err(lookup_error)?;

        self.feed.publish(ChangeEvent::PaymentProcessed {
            owner_id: owner_id.to_string(),
            student_id,
        });
        log::info!("payment processed for {} under {owner_id}", student.name);

        Ok(student)
    }

    /// All records for one calendar day, newest first.
    pub async fn daily_attendance(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let (start, end) = day_bounds(date);
        self.attendance
            .query_by_date(owner_id, start, end)
            .await
            .map_err(lookup_error)
    }

    /// Per-student history over a date range, paginated.
    pub async fn history(
        &self,
        owner_id: &str,
        student_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<AttendanceRecord>> {
        let start = day_bounds(from.unwrap_or(NaiveDate::MIN)).0;
        let end = day_bounds(to.unwrap_or_else(|| Utc::now().date_naive())).1;

        let records = self
            .attendance
            .query_by_student(owner_id, student_id, start, end)
            .await
            .map_err(lookup_error)?;

        let total = records.len() as i64;
        let offset = params.get_offset() as usize;
        let per_page = params.get_per_page() as usize;
        let items: Vec<AttendanceRecord> =
            records.into_iter().skip(offset).take(per_page).collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    /// Create-then-increment with rollback: a record only survives if its
    /// count increment landed. Returns the record and the store-confirmed
    /// new count.
    async fn create_counted_record(
        &self,
        student: &Student,
        now: DateTime<Utc>,
        status: AttendanceStatus,
    ) -> AppResult<(AttendanceRecord, i32)> {
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            student_id: student.id,
            owner_id: student.owner_id.clone(),
            name: student.name.clone(),
            subject: student.subject.clone(),
            timestamp: now,
            status,
        };

        self.attendance
            .create(record.clone())
            .await
            .map_err(mutation_error)?;

        match self
            .students
            .increment_count(&student.owner_id, student.id, 1)
            .await
        {
            Ok(new_count) => Ok((record, new_count)),
            Err(e) => {
                if let Err(rollback_err) =
                    self.attendance.delete(&student.owner_id, record.id).await
                {
                    log::error!(
                        "failed to roll back orphan record {}: {rollback_err}",
                        record.id
                    );
                }
                Err(mutation_error(e))
            }
        }
    }
}

fn rejection(reason: RejectReason, student: &Student) -> CheckInOutcome {
    CheckInOutcome::Rejected {
        reason,
        message: reason.message(&student.name),
    }
}
