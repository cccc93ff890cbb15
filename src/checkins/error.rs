//! Error taxonomy for check-in submission and attribution queries.

use thiserror::Error;

use crate::db::DatabaseError;
use crate::scoring::AllocationError;

#[derive(Error, Debug)]
pub enum CheckinError {
    /// Caller input rejected; nothing was written.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Derived data disagreed with its source. Always fatal for the operation.
    #[error("Consistency violation: {0}")]
    Consistency(String),

    /// Storage failure; the whole operation was rolled back and may be retried.
    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl CheckinError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Only storage failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl From<DatabaseError> for CheckinError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Database(other),
        }
    }
}

impl From<rusqlite::Error> for CheckinError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::Sqlite(err))
    }
}

impl From<AllocationError> for CheckinError {
    fn from(err: AllocationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_not_found_maps_to_not_found() {
        let err: CheckinError = DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: "abc".into(),
        }
        .into();
        assert!(matches!(err, CheckinError::NotFound { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn sqlite_errors_are_retryable() {
        let err: CheckinError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn allocation_errors_are_validation() {
        let err: CheckinError = AllocationError::TotalOutOfRange { total: 90.0 }.into();
        assert!(matches!(err, CheckinError::Validation(ref m) if m.contains("100%")));
    }
}
