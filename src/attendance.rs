use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::Period;
use crate::error::{Error, Result};
use crate::record_validation;
use crate::schedule::{DayName, Session, day_name_from_date, lookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "Hadir")]
    Present,
    #[serde(rename = "Izin")]
    ExcusedLeave,
    #[serde(rename = "Sakit")]
    Sick,
    #[serde(rename = "Alpa")]
    Absent,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::ExcusedLeave,
        AttendanceStatus::Sick,
        AttendanceStatus::Absent,
    ];

    /// Stored and displayed label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Hadir",
            AttendanceStatus::ExcusedLeave => "Izin",
            AttendanceStatus::Sick => "Sakit",
            AttendanceStatus::Absent => "Alpa",
        }
    }

    pub fn requires_photo(&self) -> bool {
        matches!(self, AttendanceStatus::Present)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hadir" | "present" => Ok(AttendanceStatus::Present),
            "izin" | "excused" | "excusedleave" => Ok(AttendanceStatus::ExcusedLeave),
            "sakit" | "sick" => Ok(AttendanceStatus::Sick),
            "alpa" | "absent" => Ok(AttendanceStatus::Absent),
            other => Err(Error::invalid(format!("unknown attendance status '{other}'"))),
        }
    }
}

/// A stored attendance row. Subject, teacher and PJ are copied from the
/// timetable when the row is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub session: Session,
    pub day_name: DayName,
    pub subject: String,
    pub teacher: String,
    #[serde(rename = "pj")]
    pub responsible_person: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn from_draft(id: impl Into<String>, draft: AttendanceDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            user_id: draft.user_id,
            date: draft.date,
            session: draft.session,
            day_name: draft.day_name,
            subject: draft.subject,
            teacher: draft.teacher,
            responsible_person: draft.responsible_person,
            status: draft.status,
            note: draft.note,
            photo_path: draft.photo_path,
            photo_url: draft.photo_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// The (user, date, session) key the store keeps unique.
    pub fn slot_key(&self) -> (&str, NaiveDate, Session) {
        (self.user_id.as_str(), self.date, self.session)
    }
}

/// The insert shape of a record: everything except id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceDraft {
    pub user_id: String,
    pub date: NaiveDate,
    pub session: Session,
    pub day_name: DayName,
    pub subject: String,
    pub teacher: String,
    #[serde(rename = "pj")]
    pub responsible_person: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl AttendanceDraft {
    /// Fills day name and timetable fields for the slot. Subject, teacher and
    /// PJ stay blank when nothing is scheduled for that slot.
    pub fn prefilled(
        user_id: impl Into<String>,
        date: NaiveDate,
        session: Session,
        status: AttendanceStatus,
    ) -> Self {
        let day_name = day_name_from_date(date);
        let entry = lookup(day_name, session);
        Self {
            user_id: user_id.into(),
            date,
            session,
            day_name,
            subject: entry.map(|e| e.subject.to_string()).unwrap_or_default(),
            teacher: entry.map(|e| e.teacher.to_string()).unwrap_or_default(),
            responsible_person: entry
                .map(|e| e.responsible_person.to_string())
                .unwrap_or_default(),
            status,
            note: None,
            photo_path: None,
            photo_url: None,
        }
    }

    /// Blank notes are stored as absent.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }

    pub fn with_photo(mut self, path: impl Into<String>, url: impl Into<String>) -> Self {
        self.photo_path = Some(path.into());
        self.photo_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        record_validation::validate_draft(self)?;
        Ok(())
    }
}

/// Criteria applied to a history list. Unset criteria match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
}

impl RecordFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.period.is_none_or(|period| period.contains(record.date))
            && self.session.is_none_or(|session| session == record.session)
            && self.status.is_none_or(|status| status == record.status)
    }

    pub fn apply<'a, I>(&self, records: I) -> Vec<AttendanceRecord>
    where
        I: IntoIterator<Item = &'a AttendanceRecord>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// Extension used when the uploaded name carries none.
pub const DEFAULT_PHOTO_EXTENSION: &str = "jpg";

/// Extension of the last path segment, ignoring any query or fragment.
fn photo_extension(source: &str) -> &str {
    let without_query = source.split(['?', '#']).next().unwrap_or(source);
    let file_name = without_query.rsplit('/').next().unwrap_or(without_query);
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(DEFAULT_PHOTO_EXTENSION)
}

/// Object-storage key for an evidence photo: `<user>/<YYYY-MM>/<timestamp>.<ext>`.
/// `source` may be a file name or a URL.
pub fn photo_storage_path(
    user_id: &str,
    date: NaiveDate,
    timestamp_millis: i64,
    source: &str,
) -> Result<String> {
    if user_id.trim().is_empty() {
        return Err(Error::invalid("photo path requires a user id"));
    }
    Ok(format!(
        "{user_id}/{}/{timestamp_millis}.{}",
        Period::of(date),
        photo_extension(source)
    ))
}
