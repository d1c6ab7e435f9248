use chrono::Utc;
use uuid::Uuid;

use crate::config::AttendanceConfig;
use crate::entities::{Student, StudentStatus, UsageType};
use crate::error::{AppError, AppResult};
use crate::models::{RegisterStudentRequest, StudentResponse, UpdateStudentRequest};
use crate::services::attendance_ledger::compute_payment_due;
use crate::services::{ChangeEvent, ChangeFeed, lookup_error, mutation_error};
use crate::store::StudentStore;
use crate::utils::pin::{is_valid_pin, pin_from_contact};

#[derive(Clone)]
pub struct StudentService<S: StudentStore> {
    students: S,
    feed: ChangeFeed,
    settings: AttendanceConfig,
}

impl<S: StudentStore> StudentService<S> {
    pub fn new(students: S, feed: ChangeFeed, settings: AttendanceConfig) -> Self {
        Self {
            students,
            feed,
            settings,
        }
    }

    pub async fn register(
        &self,
        owner_id: &str,
        request: RegisterStudentRequest,
    ) -> AppResult<StudentResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }
        if request.subject.trim().is_empty() {
            return Err(AppError::ValidationError("Subject is required".to_string()));
        }

        let pin = match &request.pin {
            Some(pin) => {
                if !is_valid_pin(pin) {
                    return Err(AppError::ValidationError(
                        "PIN must be exactly 4 numeric digits".to_string(),
                    ));
                }
                pin.clone()
            }
            None => {
                let contact = request.contact.as_deref().unwrap_or("");
                pin_from_contact(contact).ok_or_else(|| {
                    AppError::ValidationError(
                        "Contact must contain at least 4 digits to derive a PIN".to_string(),
                    )
                })?
            }
        };

        let usage_type = request.usage_type.unwrap_or(UsageType::Session);
        let total_count = request.total_count.unwrap_or(0);
        if usage_type == UsageType::Session && total_count <= 0 {
            return Err(AppError::ValidationError(
                "Session students need a positive lesson count".to_string(),
            ));
        }
        if total_count < 0 {
            return Err(AppError::ValidationError(
                "Lesson count cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let student = Student {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            name: request.name.trim().to_string(),
            contact: request.contact,
            pin,
            subject: request.subject.trim().to_string(),
            branch: request
                .branch
                .unwrap_or_else(|| self.settings.default_branch.clone()),
            usage_type,
            total_count,
            current_count: 0,
            // Registration time doubles as the first payment anchor so new
            // students show a payment date immediately.
            last_payment_date: now,
            status: StudentStatus::Active,
            reg_date: request.reg_date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
        };

        self.students
            .insert(student.clone())
            .await
            .map_err(mutation_error)?;

        // The PIN is a check-in credential; keep it out of the logs.
        log::info!(
            "registered student {} ({}) under {owner_id}",
            student.name,
            student.id
        );
        self.feed.publish(ChangeEvent::StudentChanged {
            owner_id: owner_id.to_string(),
            student_id: student.id,
        });

        Ok(self.to_response(student))
    }

    /// Full roster with freshly derived payment state; students needing
    /// payment sort to the top, then by name.
    pub async fn list(&self, owner_id: &str) -> AppResult<Vec<StudentResponse>> {
        let students = self.students.list(owner_id).await.map_err(lookup_error)?;

        let mut responses: Vec<StudentResponse> = students
            .into_iter()
            .map(|s| self.to_response(s))
            .collect();
        responses.sort_by(|a, b| {
            let a_due = a.payment_due.needs_payment();
            let b_due = b.payment_due.needs_payment();
            b_due.cmp(&a_due).then_with(|| a.name.cmp(&b.name))
        });

        Ok(responses)
    }

    pub async fn get(&self, owner_id: &str, student_id: Uuid) -> AppResult<StudentResponse> {
        let student = self
            .students
            .get_by_id(owner_id, student_id)
            .await
            .map_err(lookup_error)?;
        Ok(self.to_response(student))
    }

    pub async fn update(
        &self,
        owner_id: &str,
        student_id: Uuid,
        request: UpdateStudentRequest,
    ) -> AppResult<StudentResponse> {
        let mut student = self
            .students
            .get_by_id(owner_id, student_id)
            .await
            .map_err(lookup_error)?;

        if let Some(pin) = &request.pin {
            if !is_valid_pin(pin) {
                return Err(AppError::ValidationError(
                    "PIN must be exactly 4 numeric digits".to_string(),
                ));
            }
            student.pin = pin.clone();
        }
        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError("Name is required".to_string()));
            }
            student.name = name.trim().to_string();
        }
        if let Some(contact) = request.contact {
            student.contact = Some(contact);
        }
        if let Some(subject) = request.subject {
            student.subject = subject;
        }
        if let Some(branch) = request.branch {
            student.branch = branch;
        }
        if let Some(usage_type) = request.usage_type {
            student.usage_type = usage_type;
        }
        if let Some(total_count) = request.total_count {
            if total_count < 0 {
                return Err(AppError::ValidationError(
                    "Lesson count cannot be negative".to_string(),
                ));
            }
            student.total_count = total_count;
        }
        if let Some(current_count) = request.current_count {
            if current_count < 0 {
                return Err(AppError::ValidationError(
                    "Consumed count cannot be negative".to_string(),
                ));
            }
            student.current_count = current_count;
        }
        if let Some(status) = request.status {
            student.status = status;
        }

        self.students
            .update(student.clone())
            .await
            .map_err(mutation_error)?;

        self.feed.publish(ChangeEvent::StudentChanged {
            owner_id: owner_id.to_string(),
            student_id,
        });

        Ok(self.to_response(student))
    }

    pub async fn delete(&self, owner_id: &str, student_id: Uuid) -> AppResult<()> {
        self.students
            .remove(owner_id, student_id)
            .await
            .map_err(mutation_error)?;

        log::info!("deleted student {student_id} under {owner_id}");
        self.feed.publish(ChangeEvent::StudentRemoved {
            owner_id: owner_id.to_string(),
            student_id,
        });

        Ok(())
    }

    pub async fn payment_due(
        &self,
        owner_id: &str,
        student_id: Uuid,
    ) -> AppResult<crate::models::PaymentDueStatus> {
        let student = self
            .students
            .get_by_id(owner_id, student_id)
            .await
            .map_err(lookup_error)?;
        Ok(compute_payment_due(
            &student,
            Utc::now().date_naive(),
            self.settings.imminent_threshold,
        ))
    }

    /// Walk every account, recompute payment state, and publish a reminder
    /// for each student who needs payment. Returns the reminder count.
    pub async fn scan_payment_due(&self) -> AppResult<i64> {
        let today = Utc::now().date_naive();
        let owners = self.students.list_owners().await.map_err(lookup_error)?;

        let mut reminded = 0i64;
        for owner_id in owners {
            let students = self.students.list(&owner_id).await.map_err(lookup_error)?;
            for student in students {
                let status =
                    compute_payment_due(&student, today, self.settings.imminent_threshold);
                if !status.needs_payment() {
                    continue;
                }
                log::info!(
                    "payment due for {} under {owner_id}: {status:?}",
                    student.name
                );
                self.feed.publish(ChangeEvent::PaymentDueReminder {
                    owner_id: owner_id.clone(),
                    student_id: student.id,
                    student_name: student.name.clone(),
                    status,
                });
                reminded += 1;
            }
        }

        Ok(reminded)
    }

    fn to_response(&self, student: Student) -> StudentResponse {
        let payment_due = compute_payment_due(
            &student,
            Utc::now().date_naive(),
            self.settings.imminent_threshold,
        );
        StudentResponse::new(student, payment_due)
    }
}
