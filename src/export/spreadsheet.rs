use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatUnderline, Url, Workbook, Worksheet,
};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

use super::{ExportResult, ExportRow, HEADERS, PHOTO_COLUMN, PHOTO_LINK_LABEL};
use crate::attendance::AttendanceRecord;

pub const SHEET_NAME: &str = "Riwayat Absensi";

const HEADER_FILL: u32 = 0xEAF1E0;
const BORDER_COLOR: u32 = 0xBFBFBF;
const LINK_COLOR: u32 = 0x0563C1;
const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 60;

/// Longest string Excel stores in one cell.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Cuts text to [`MAX_CELL_CHARS`] characters.
pub fn cell_text(value: &str) -> Cow<'_, str> {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => Cow::Owned(value[..cut].to_string()),
        None => Cow::Borrowed(value),
    }
}

/// Widest content plus padding, clamped to a readable range.
pub fn column_width(widest_chars: usize) -> f64 {
    (widest_chars + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as f64
}

fn bordered(format: Format) -> Format {
    format
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(BORDER_COLOR))
        .set_align(FormatAlign::VerticalCenter)
}

pub fn to_spreadsheet(records: &[AttendanceRecord]) -> ExportResult<Vec<u8>> {
    let header_format = bordered(
        Format::new()
            .set_bold()
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_align(FormatAlign::Center),
    );
    let body_format = bordered(Format::new().set_align(FormatAlign::Left));
    let photo_format = bordered(Format::new().set_align(FormatAlign::Center));
    let link_format = bordered(
        Format::new()
            .set_align(FormatAlign::Center)
            .set_font_color(Color::RGB(LINK_COLOR))
            .set_underline(FormatUnderline::Single),
    );

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        let export = ExportRow::from(record);
        for (col, value) in export.cells.iter().enumerate() {
            let col_idx = col as u16;
            let written = match (col, export.photo_url.as_deref()) {
                (PHOTO_COLUMN, Some(url)) => {
                    write_photo_link(worksheet, row, col_idx, url, &link_format, &photo_format)?
                }
                (PHOTO_COLUMN, None) => {
                    worksheet.write_string_with_format(row, col_idx, value, &photo_format)?;
                    value.chars().count()
                }
                _ => {
                    let text = cell_text(value);
                    worksheet.write_string_with_format(row, col_idx, text.as_ref(), &body_format)?;
                    text.chars().count()
                }
            };
            widths[col] = widths[col].max(written);
        }
    }

    for (col, widest) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, column_width(*widest))?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    let buffer = workbook.save_to_buffer()?;
    tracing::debug!(rows = records.len(), bytes = buffer.len(), "rendered xlsx export");
    Ok(buffer)
}

/// Writes a clickable link labelled [`PHOTO_LINK_LABEL`]. URLs the workbook
/// cannot link (unknown scheme, over Excel's length limit) are kept as plain
/// text so the row still exports. Returns the displayed width in chars.
fn write_photo_link(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    url: &str,
    link_format: &Format,
    text_format: &Format,
) -> ExportResult<usize> {
    let link = Url::new(url).set_text(PHOTO_LINK_LABEL);
    match worksheet.write_url_with_format(row, col, link, link_format) {
        Ok(_) => Ok(PHOTO_LINK_LABEL.chars().count()),
        Err(err) => {
            tracing::debug!(row, error = %err, "photo url written as text");
            let text = cell_text(url);
            worksheet.write_string_with_format(row, col, text.as_ref(), text_format)?;
            Ok(text.chars().count())
        }
    }
}

pub fn write_spreadsheet<P: AsRef<Path>>(records: &[AttendanceRecord], path: P) -> ExportResult<()> {
    let buffer = to_spreadsheet(records)?;
    fs::write(path.as_ref(), buffer)?;
    tracing::info!(path = %path.as_ref().display(), rows = records.len(), "wrote xlsx export");
    Ok(())
}
