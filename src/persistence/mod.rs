use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::attendance::{AttendanceDraft, AttendanceRecord};
use crate::calendar::Period;
use crate::record_validation::{self, RecordValidationError};
use crate::schedule::Session;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid record: {0}")]
    Validation(#[from] RecordValidationError),

    /// The (user, date, session) slot already has a record.
    #[error("user {user_id} already recorded the {session} session on {date}")]
    Duplicate {
        user_id: String,
        date: NaiveDate,
        session: Session,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Stand-in for the hosted attendance table.
pub trait AttendanceStore {
    /// Validates the draft and stores it with fresh id and timestamps.
    fn insert_at(
        &self,
        draft: AttendanceDraft,
        now: DateTime<Utc>,
    ) -> PersistenceResult<AttendanceRecord>;

    /// Stores already-materialized records as-is, e.g. from a JSON export.
    fn import_records(&self, records: &[AttendanceRecord]) -> PersistenceResult<usize>;

    /// Newest first; on the same date the evening session comes first.
    fn records_for_user(&self, user_id: &str) -> PersistenceResult<Vec<AttendanceRecord>>;

    /// Inclusive on both ends, newest first.
    fn records_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PersistenceResult<Vec<AttendanceRecord>>;

    fn recent_records(&self, user_id: &str, limit: usize)
    -> PersistenceResult<Vec<AttendanceRecord>>;

    fn insert(&self, draft: AttendanceDraft) -> PersistenceResult<AttendanceRecord> {
        self.insert_at(draft, Utc::now())
    }

    fn records_in_period(
        &self,
        user_id: &str,
        period: Period,
    ) -> PersistenceResult<Vec<AttendanceRecord>> {
        let (start, end) = period
            .range()
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        self.records_between(user_id, start, end)
    }
}

pub fn validate_records(records: &[AttendanceRecord]) -> PersistenceResult<()> {
    record_validation::validate_record_collection(records)?;
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{load_records_from_json, save_records_to_json};
