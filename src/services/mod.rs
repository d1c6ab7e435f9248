pub mod attendance_ledger;
pub mod change_feed;
pub mod pin_resolver;
pub mod student_service;

pub use attendance_ledger::*;
pub use change_feed::*;
pub use pin_resolver::*;
pub use student_service::*;

use crate::error::AppError;
use crate::store::StoreError;

/// Store failure during the query phase: nothing was mutated, the caller may
/// retry the whole operation.
pub(crate) fn lookup_error(e: StoreError) -> AppError {
    match e {
        StoreError::NotFound(msg) => AppError::NotFound(msg),
        other => AppError::LookupError(other.to_string()),
    }
}

/// Store failure during the write phase: final state is unknown to the
/// caller until re-queried.
pub(crate) fn mutation_error(e: StoreError) -> AppError {
    match e {
        StoreError::NotFound(msg) => AppError::NotFound(msg),
        other => AppError::MutationError(other.to_string()),
    }
}
