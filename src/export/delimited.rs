use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs;
use std::path::Path;

use super::{ExportError, ExportResult, ExportRow, HEADERS, PHOTO_COLUMN, PHOTO_LINK_LABEL};
use crate::attendance::AttendanceRecord;

pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Spreadsheet formula that opens `url` when clicked.
pub fn hyperlink_formula(url: &str, label: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\",\"{}\")",
        url.replace('"', "\"\""),
        label.replace('"', "\"\"")
    )
}

/// Every field quoted, CRLF rows, BOM first. Photo links become
/// `=HYPERLINK(...)` cells so they stay clickable in spreadsheet software.
pub fn to_delimited_text(records: &[AttendanceRecord]) -> ExportResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for record in records {
        let mut row = ExportRow::from(record);
        if let Some(url) = row.photo_url.as_deref() {
            row.cells[PHOTO_COLUMN] = hyperlink_formula(url, PHOTO_LINK_LABEL);
        }
        writer.write_record(&row.cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    let body = String::from_utf8(bytes)?;

    let mut text = String::with_capacity(body.len() + BYTE_ORDER_MARK.len_utf8());
    text.push(BYTE_ORDER_MARK);
    text.push_str(&body);
    tracing::debug!(rows = records.len(), "rendered csv export");
    Ok(text)
}

pub fn write_delimited_text<P: AsRef<Path>>(
    records: &[AttendanceRecord],
    path: P,
) -> ExportResult<()> {
    let text = to_delimited_text(records)?;
    fs::write(path.as_ref(), text)?;
    tracing::info!(path = %path.as_ref().display(), rows = records.len(), "wrote csv export");
    Ok(())
}
