//! History export: a quoted CSV text and a styled XLSX workbook.
//!
//! Both forms share one fixed column layout. Notes are whitespace-normalized
//! and empty values render as a dash.

use std::string::FromUtf8Error;
use thiserror::Error;

use crate::attendance::AttendanceRecord;
use crate::calendar::Period;

pub mod delimited;
pub mod spreadsheet;

pub use delimited::{to_delimited_text, write_delimited_text};
pub use spreadsheet::{to_spreadsheet, write_spreadsheet};

pub const HEADERS: [&str; 9] = [
    "Tanggal", "Sesi", "Hari", "Kajian", "Pengajar", "PJ", "Status", "Catatan", "URL Foto",
];

pub const PHOTO_COLUMN: usize = 8;
pub const PHOTO_LINK_LABEL: &str = "Lihat";
pub const PLACEHOLDER: &str = "-";
pub const EXPORT_DATE_PATTERN: &str = "%d/%m/%Y";

pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLSX_FILENAME: &str = "riwayat-absensi.xlsx";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("export produced invalid utf-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// `riwayat-absensi-<YYYY-MM>.csv`
pub fn csv_filename(period: Period) -> String {
    format!("riwayat-absensi-{period}.csv")
}

/// Collapses whitespace runs to one space and trims; blank becomes `-`.
pub fn normalize_note(note: Option<&str>) -> String {
    let normalized = note
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    if normalized.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        normalized
    }
}

/// One record laid out in [`HEADERS`] order. The photo cell holds the link
/// label; each writer decides how to attach the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportRow {
    pub cells: [String; 9],
    pub photo_url: Option<String>,
}

impl From<&AttendanceRecord> for ExportRow {
    fn from(record: &AttendanceRecord) -> Self {
        let photo_url = record
            .photo_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        let photo_cell = if photo_url.is_some() {
            PHOTO_LINK_LABEL
        } else {
            PLACEHOLDER
        };
        Self {
            cells: [
                record.date.format(EXPORT_DATE_PATTERN).to_string(),
                record.session.label().to_string(),
                record.day_name.to_string(),
                record.subject.clone(),
                record.teacher.clone(),
                record.responsible_person.clone(),
                record.status.to_string(),
                normalize_note(record.note.as_deref()),
                photo_cell.to_string(),
            ],
            photo_url,
        }
    }
}
