use crate::attendance::{AttendanceDraft, AttendanceRecord};
use crate::schedule::{DayName, day_name_from_date};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordValidationError {
    message: String,
}

impl RecordValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RecordValidationError {}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn validate_slot(user_id: &str, date: NaiveDate, day_name: DayName) -> Result<(), RecordValidationError> {
    if user_id.trim().is_empty() {
        return Err(RecordValidationError::new(format!(
            "attendance on {date} has no user id"
        )));
    }
    let expected = day_name_from_date(date);
    if day_name != expected {
        return Err(RecordValidationError::new(format!(
            "day name {day_name} does not match {date} (expected {expected})"
        )));
    }
    Ok(())
}

/// Checks applied before a draft is handed to a store.
pub fn validate_draft(draft: &AttendanceDraft) -> Result<(), RecordValidationError> {
    validate_slot(&draft.user_id, draft.date, draft.day_name)?;

    if draft.status.requires_photo() && is_blank(draft.photo_url.as_deref()) {
        return Err(RecordValidationError::new(format!(
            "status {} on {} {} requires a photo",
            draft.status, draft.date, draft.session
        )));
    }
    if draft.photo_path.is_some() && is_blank(draft.photo_path.as_deref()) {
        return Err(RecordValidationError::new("photo_path must not be blank"));
    }
    if draft.photo_url.is_some() && is_blank(draft.photo_url.as_deref()) {
        return Err(RecordValidationError::new("photo_url must not be blank"));
    }
    Ok(())
}

/// Stored rows are not re-checked for photos: older rows may predate that rule.
pub fn validate_record(record: &AttendanceRecord) -> Result<(), RecordValidationError> {
    if record.id.trim().is_empty() {
        return Err(RecordValidationError::new(format!(
            "attendance on {} {} has no id",
            record.date, record.session
        )));
    }
    validate_slot(&record.user_id, record.date, record.day_name)?;
    if record.updated_at < record.created_at {
        return Err(RecordValidationError::new(format!(
            "record {} was updated before it was created",
            record.id
        )));
    }
    Ok(())
}

pub fn validate_record_collection(records: &[AttendanceRecord]) -> Result<(), RecordValidationError> {
    let mut seen_ids = HashSet::with_capacity(records.len());
    let mut seen_slots = HashSet::with_capacity(records.len());
    for record in records {
        if !seen_ids.insert(record.id.as_str()) {
            return Err(RecordValidationError::new(format!(
                "duplicate record id {}",
                record.id
            )));
        }
        if !seen_slots.insert(record.slot_key()) {
            return Err(RecordValidationError::new(format!(
                "user {} already has a {} record on {}",
                record.user_id, record.session, record.date
            )));
        }
        validate_record(record)?;
    }
    Ok(())
}
