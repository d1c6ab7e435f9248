use crate::error::{AppError, AppResult};
use crate::models::ResolveResult;
use crate::services::lookup_error;
use crate::store::StudentStore;
use crate::utils::pin::is_valid_pin;

/// Resolves a 4-digit keypad entry to zero, one, or many students within one
/// academy scope. Pure lookup, no side effects.
#[derive(Clone)]
pub struct PinResolver<S: StudentStore> {
    students: S,
}

impl<S: StudentStore> PinResolver<S> {
    pub fn new(students: S) -> Self {
        Self { students }
    }

    /// The caller collects exactly 4 digits before invoking; partial keypad
    /// entry is UI state and never reaches this component. Break students
    /// are included in matches so check-in can report the specific reason
    /// instead of an anonymous "not found".
    pub async fn resolve(&self, owner_id: &str, pin: &str) -> AppResult<ResolveResult> {
        if !is_valid_pin(pin) {
            return Err(AppError::ValidationError(
                "PIN must be exactly 4 numeric digits".to_string(),
            ));
        }

        let mut matches = self
            .students
            .find_by_pin(owner_id, pin)
            .await
            .map_err(lookup_error)?;

        let result = match matches.len() {
            0 => {
                log::info!("PIN resolution found no student under {owner_id}");
                ResolveResult::NotFound
            }
            1 => ResolveResult::SingleMatch {
                student: matches.remove(0),
            },
            n => {
                log::info!("PIN resolution ambiguous under {owner_id}: {n} siblings");
                ResolveResult::Ambiguous { students: matches }
            }
        };

        Ok(result)
    }
}
