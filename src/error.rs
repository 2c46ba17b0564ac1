//! Error types for the date, schedule and aggregation helpers.

use thiserror::Error;

use crate::record_validation::RecordValidationError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid attendance record: {0}")]
    Validation(#[from] RecordValidationError),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
