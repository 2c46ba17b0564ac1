use chrono::{NaiveDate, TimeZone, Utc};
use absensi_kajian::export::delimited::BYTE_ORDER_MARK;
use absensi_kajian::export::{HEADERS, XLSX_FILENAME, normalize_note};
use absensi_kajian::{
    AttendanceDraft, AttendanceRecord, AttendanceStatus, Period, Session, csv_filename,
    to_delimited_text, to_spreadsheet, write_delimited_text, write_spreadsheet,
};
use absensi_kajian::export::spreadsheet::{MAX_CELL_CHARS, SHEET_NAME, column_width};
use std::io::{Cursor, Read};
use tempfile::NamedTempFile;
use zip::ZipArchive;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_records() -> Vec<AttendanceRecord> {
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 1, 0, 0).unwrap();

    let present = AttendanceDraft::prefilled("u1", d(2025, 3, 3), Session::Morning, AttendanceStatus::Present)
        .with_note("He said, \"ok\"   now")
        .with_photo("u1/2025-03/1.jpg", "https://cdn.test/u1/2025-03/1.jpg");
    let sick = AttendanceDraft::prefilled("u1", d(2025, 3, 4), Session::Evening, AttendanceStatus::Sick);
    // Legacy row: Hadir without evidence
    let legacy = AttendanceDraft::prefilled("u1", d(2025, 3, 5), Session::Morning, AttendanceStatus::Present);

    vec![
        AttendanceRecord::from_draft("r1", present, now),
        AttendanceRecord::from_draft("r2", sick, now),
        AttendanceRecord::from_draft("r3", legacy, now),
    ]
}

fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let body = text
        .strip_prefix(BYTE_ORDER_MARK)
        .expect("csv should start with a byte-order mark");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(body.as_bytes());
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn csv_round_trips_cell_values() {
    let text = to_delimited_text(&sample_records()).unwrap();
    let rows = parse_csv(&text);

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>());
    assert_eq!(
        rows[1],
        vec![
            "03/03/2025",
            "Pagi",
            "Senin",
            "Psikologi Agama",
            "ustadzah Niha",
            "Alvia",
            "Hadir",
            "He said, \"ok\" now",
            "=HYPERLINK(\"https://cdn.test/u1/2025-03/1.jpg\",\"Lihat\")",
        ]
    );
    assert_eq!(rows[2][1], "Malam");
    assert_eq!(rows[2][6], "Sakit");
    assert_eq!(rows[2][7], "-");
    assert_eq!(rows[2][8], "-");
}

#[test]
fn csv_quotes_every_field_and_doubles_inner_quotes() {
    let text = to_delimited_text(&sample_records()).unwrap();
    assert!(text.starts_with('\u{FEFF}'));
    assert!(text.contains("\"He said, \"\"ok\"\" now\""));
    assert!(text.contains("\"=HYPERLINK(\"\"https://cdn.test/u1/2025-03/1.jpg\"\",\"\"Lihat\"\")\""));
    assert!(text.contains("\r\n"));

    let header_line = text
        .trim_start_matches(BYTE_ORDER_MARK)
        .split("\r\n")
        .next()
        .unwrap();
    assert_eq!(
        header_line,
        "\"Tanggal\",\"Sesi\",\"Hari\",\"Kajian\",\"Pengajar\",\"PJ\",\"Status\",\"Catatan\",\"URL Foto\""
    );
}

#[test]
fn present_without_photo_renders_placeholder() {
    let rows = parse_csv(&to_delimited_text(&sample_records()).unwrap());
    assert_eq!(rows[3][6], "Hadir");
    assert_eq!(rows[3][8], "-");
}

#[test]
fn empty_export_has_only_headers() {
    let rows = parse_csv(&to_delimited_text(&[]).unwrap());
    assert_eq!(rows.len(), 1);
}

#[test]
fn note_normalization() {
    assert_eq!(normalize_note(Some("a\t\tb\n c ")), "a b c");
    assert_eq!(normalize_note(Some("")), "-");
}

#[test]
fn filenames_follow_download_names() {
    assert_eq!(
        csv_filename(Period::new(2025, 3).unwrap()),
        "riwayat-absensi-2025-03.csv"
    );
    assert_eq!(XLSX_FILENAME, "riwayat-absensi.xlsx");
}

#[test]
fn spreadsheet_is_a_zip_container() {
    let bytes = to_spreadsheet(&sample_records()).unwrap();
    assert!(bytes.len() > 100);
    assert_eq!(&bytes[..2], b"PK");
}

fn workbook_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

/// Stored `<col width>` for a whole-number width set through the writer.
fn stored_width(chars: usize) -> String {
    format!("width=\"{}\"", column_width(chars) + 0.7109375)
}

fn record_with(note: &str, photo_url: &str) -> AttendanceRecord {
    let draft = AttendanceDraft::prefilled("u1", d(2025, 3, 3), Session::Morning, AttendanceStatus::Present)
        .with_note(note)
        .with_photo("u1/2025-03/1.jpg", photo_url);
    AttendanceRecord::from_draft("r1", draft, Utc.with_ymd_and_hms(2025, 3, 10, 1, 0, 0).unwrap())
}

#[test]
fn spreadsheet_layout_and_styles() {
    let bytes = to_spreadsheet(&sample_records()).unwrap();

    let workbook = workbook_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains(&format!("name=\"{SHEET_NAME}\"")));

    let sheet = workbook_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<pane ySplit=\"1\""));
    assert!(sheet.contains("state=\"frozen\""));
    assert!(sheet.contains("<cols>"));
    // Tanggal: "03/03/2025" is the widest value
    assert!(sheet.contains(&stored_width(10)));
    // Sesi never reaches the minimum width
    assert!(sheet.contains(&stored_width(4)));
    assert!(!sheet.contains("HYPERLINK("));

    let styles = workbook_part(&bytes, "xl/styles.xml");
    assert!(styles.contains("<b/>"));
    assert!(styles.contains("rgb=\"FFEAF1E0\""));
    assert!(styles.contains("style=\"thin\""));
    assert!(styles.contains("rgb=\"FFBFBFBF\""));
}

#[test]
fn spreadsheet_photo_cells_are_real_links() {
    let bytes = to_spreadsheet(&sample_records()).unwrap();

    let sheet = workbook_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<hyperlinks>"));
    assert!(sheet.contains("ref=\"I2\""));
    assert!(!sheet.contains("ref=\"I4\""));

    let rels = workbook_part(&bytes, "xl/worksheets/_rels/sheet1.xml.rels");
    assert!(rels.contains("Target=\"https://cdn.test/u1/2025-03/1.jpg\""));
    assert!(rels.contains("TargetMode=\"External\""));

    let strings = workbook_part(&bytes, "xl/sharedStrings.xml");
    assert!(strings.contains(">Lihat<"));
}

#[test]
fn unlinkable_photo_urls_are_kept_as_text() {
    let relative = "attendance-proofs/u1/2025-03/1.jpg";
    let oversized = format!("https://cdn.test/{}", "a".repeat(2_100));

    for url in [relative.to_string(), oversized] {
        let bytes = to_spreadsheet(&[record_with("-", &url)]).unwrap();
        let sheet = workbook_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(!sheet.contains("<hyperlinks>"));
        let strings = workbook_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains(&url));
    }
}

#[test]
fn oversized_note_is_truncated_in_spreadsheet_only() {
    let note = "x".repeat(40_000);
    let records = [record_with(&note, "https://cdn.test/1.jpg")];

    let bytes = to_spreadsheet(&records).unwrap();
    let strings = workbook_part(&bytes, "xl/sharedStrings.xml");
    assert!(strings.contains(&"x".repeat(MAX_CELL_CHARS)));
    assert!(!strings.contains(&"x".repeat(MAX_CELL_CHARS + 1)));
    let sheet = workbook_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(&stored_width(MAX_CELL_CHARS)));

    let rows = parse_csv(&to_delimited_text(&records).unwrap());
    assert_eq!(rows[1][7].len(), 40_000);
}

#[test]
fn writers_create_files() {
    let csv_file = NamedTempFile::new().unwrap();
    write_delimited_text(&sample_records(), csv_file.path()).unwrap();
    let written = std::fs::read_to_string(csv_file.path()).unwrap();
    assert!(written.starts_with('\u{FEFF}'));

    let xlsx_file = NamedTempFile::new().unwrap();
    write_spreadsheet(&sample_records(), xlsx_file.path()).unwrap();
    let written = std::fs::read(xlsx_file.path()).unwrap();
    assert_eq!(&written[..2], b"PK");
}
