use absensi_kajian::calendar::DEFAULT_DISPLAY_PATTERN;
use absensi_kajian::export::{XLSX_FILENAME, csv_filename};
use absensi_kajian::schedule::entries_for_day;
use absensi_kajian::{
    AppConfig, AttendanceDraft, AttendanceRecord, AttendanceStatus, AttendanceStore, DayName,
    Period, RecordFilter, Session, SqliteAttendanceStore, current_period, dashboard_snapshot,
    day_name_from_date, format_display_date, load_records_from_json, month_range,
    parse_input_date, photo_storage_path, save_records_to_json, today_schedules,
    write_delimited_text, write_spreadsheet, year_summary,
};
use chrono::{NaiveDate, Timelike, Utc};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Kajian attendance (CLI)")]
struct Cli {
    /// JSON config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file. In-memory when omitted.
    #[arg(long)]
    db: Option<PathBuf>,

    /// User the session acts as.
    #[arg(short, long, default_value = "local")]
    user: String,
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        let pad = widths[ci].saturating_sub(cell.chars().count());
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad));
        line.push_str(" |");
    }
    line
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn history_table(records: &[AttendanceRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                format_display_date(r.date, "%d %b %Y").unwrap_or_else(|_| r.date.to_string()),
                r.session.label().to_string(),
                r.day_name.to_string(),
                r.subject.clone(),
                r.status.to_string(),
                r.note.clone().unwrap_or_default(),
                if r.photo_url.is_some() { "ya" } else { "-" }.to_string(),
            ]
        })
        .collect();
    render_table(
        &["Tanggal", "Sesi", "Hari", "Kajian", "Status", "Catatan", "Foto"],
        &rows,
    )
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  today                                  Today's sessions (reference zone)\n  jadwal [day]                           Weekly timetable, or one day\n  range <year> <month>                   First and last day of a month\n  absen <YYYY-MM-DD|today> <session> <status> [photo_url|-] [note...]\n                                         Record attendance\n  quick <photo_url>                      Record Hadir for the current session\n  riwayat [YYYY-MM|all] [session|all] [status|all]\n                                         Filtered history\n  stats <year> <month>                   Monthly statistics\n  rekap <year>                           Yearly recap\n  dashboard                              Current month overview\n  export <csv|xlsx> <path> [YYYY-MM]     Export history\n  save json <path>                       Save all records to JSON\n  load json <path>                       Import records from JSON\n  quit|exit                              Exit"
    );
}

fn parse_filter_arg<T, F>(arg: Option<&str>, parse: F) -> Result<Option<T>, String>
where
    F: FnOnce(&str) -> Result<T, absensi_kajian::Error>,
{
    match arg {
        None | Some("all") => Ok(None),
        Some(value) => parse(value).map(Some).map_err(|e| e.to_string()),
    }
}

struct Shell {
    config: AppConfig,
    store: SqliteAttendanceStore,
    user: String,
}

impl Shell {
    fn today(&self) -> Result<NaiveDate, String> {
        let offset = self.config.offset().map_err(|e| e.to_string())?;
        Ok(absensi_kajian::calendar::today_in(Utc::now(), offset))
    }

    fn current_period(&self) -> Result<Period, String> {
        let offset = self.config.offset().map_err(|e| e.to_string())?;
        Ok(current_period(Utc::now(), offset))
    }

    fn records(&self) -> Result<Vec<AttendanceRecord>, String> {
        self.store
            .records_for_user(&self.user)
            .map_err(|e| e.to_string())
    }

    fn show_today(&self) -> Result<(), String> {
        let date = self.today()?;
        let day = day_name_from_date(date);
        let label = format_display_date(date, "%A, %d %B %Y").map_err(|e| e.to_string())?;
        println!("{label}");
        let schedules = today_schedules(day);
        if schedules.is_empty() {
            println!("Tidak ada kajian hari ini.");
        }
        for session in Session::ALL {
            if let Some(entry) = schedules.get(session) {
                println!(
                    "  {} {}  {} ({}, PJ {})  konfirmasi: {}",
                    session.label(),
                    entry.time,
                    entry.subject,
                    entry.teacher,
                    entry.responsible_person,
                    self.config.confirmation_link(session)
                );
            }
        }
        Ok(())
    }

    fn show_timetable(&self, day: Option<&str>) -> Result<(), String> {
        let days: Vec<DayName> = match day {
            Some(day) => vec![day.parse().map_err(|e: absensi_kajian::Error| e.to_string())?],
            None => DayName::ALL.to_vec(),
        };
        let rows: Vec<Vec<String>> = days
            .into_iter()
            .flat_map(entries_for_day)
            .map(|e| {
                vec![
                    e.day.to_string(),
                    e.session.label().to_string(),
                    e.time.to_string(),
                    e.subject.to_string(),
                    e.teacher.to_string(),
                    e.responsible_person.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            render_table(&["Hari", "Sesi", "Jam", "Kajian", "Pengajar", "PJ"], &rows)
        );
        Ok(())
    }

    fn record(
        &self,
        date: NaiveDate,
        session: Session,
        status: AttendanceStatus,
        photo_url: Option<&str>,
        note: &str,
    ) -> Result<(), String> {
        let mut draft = AttendanceDraft::prefilled(&self.user, date, session, status).with_note(note);
        if let Some(url) = photo_url {
            let path = photo_storage_path(&self.user, date, Utc::now().timestamp_millis(), url)
                .map_err(|e| e.to_string())?;
            draft = draft.with_photo(path, url);
        }
        let record = self.store.insert(draft).map_err(|e| e.to_string())?;
        if let Some(path) = record.photo_path.as_deref() {
            println!("Bukti foto: {}", self.config.photo_object_key(path));
        }
        println!(
            "Stored {} for {} {} ({}).",
            record.status,
            record.date,
            record.session.label(),
            if record.subject.is_empty() { "-" } else { record.subject.as_str() }
        );
        println!(
            "Konfirmasi via WhatsApp: {}",
            self.config.confirmation_link(record.session)
        );
        Ok(())
    }

    fn absen<'a>(&self, mut parts: impl Iterator<Item = &'a str>) -> Result<(), String> {
        let usage = "Usage: absen <YYYY-MM-DD|today> <session> <status> [photo_url|-] [note...]";
        let (Some(date_s), Some(session_s), Some(status_s)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(usage.to_string());
        };
        let date = if date_s == "today" {
            self.today()?
        } else {
            parse_input_date(date_s).map_err(|e| e.to_string())?
        };
        let session: Session = session_s.parse().map_err(|e: absensi_kajian::Error| e.to_string())?;
        let status: AttendanceStatus = status_s
            .parse()
            .map_err(|e: absensi_kajian::Error| e.to_string())?;
        let photo_url = parts.next().filter(|p| *p != "-");
        let note = parts.collect::<Vec<_>>().join(" ");
        self.record(date, session, status, photo_url, &note)
    }

    fn quick<'a>(&self, mut parts: impl Iterator<Item = &'a str>) -> Result<(), String> {
        let offset = self.config.offset().map_err(|e| e.to_string())?;
        let now = Utc::now().with_timezone(&offset);
        let session = Session::from_hour(now.hour());
        let photo_url = parts.next().filter(|p| *p != "-");
        self.record(now.date_naive(), session, AttendanceStatus::Present, photo_url, "")
    }

    fn history<'a>(&self, mut parts: impl Iterator<Item = &'a str>) -> Result<(), String> {
        let filter = RecordFilter {
            period: parse_filter_arg(parts.next(), |s| s.parse::<Period>())?,
            session: parse_filter_arg(parts.next(), |s| s.parse::<Session>())?,
            status: parse_filter_arg(parts.next(), |s| s.parse::<AttendanceStatus>())?,
        };
        let records = filter.apply(&self.records()?);
        if records.is_empty() {
            println!("Belum ada riwayat absensi untuk filter yang dipilih.");
        } else {
            println!("{}", history_table(&records));
        }
        Ok(())
    }

    fn stats(&self, year: i32, month: u32) -> Result<(), String> {
        let stats = absensi_kajian::monthly_stats(&self.records()?, year, month)
            .map_err(|e| e.to_string())?;
        println!(
            "{} {}: hadir={} izin={} sakit={} alpa={} total={} kehadiran={}%",
            stats.month_name,
            year,
            stats.counts.present,
            stats.counts.excused_leave,
            stats.counts.sick,
            stats.counts.absent,
            stats.total,
            stats.percentage
        );
        Ok(())
    }

    fn recap(&self, year: i32) -> Result<(), String> {
        let summary = year_summary(&self.records()?, year).map_err(|e| e.to_string())?;
        if summary.is_empty() {
            println!("Belum ada rekap absensi untuk tahun {year}.");
            return Ok(());
        }
        let rows: Vec<Vec<String>> = summary
            .months
            .iter()
            .map(|m| {
                vec![
                    m.month_name.clone(),
                    m.counts.present.to_string(),
                    m.counts.excused_leave.to_string(),
                    m.counts.sick.to_string(),
                    m.counts.absent.to_string(),
                    m.total.to_string(),
                    format!("{}%", m.percentage),
                ]
            })
            .collect();
        println!(
            "{}",
            render_table(
                &["Bulan", "Hadir", "Izin", "Sakit", "Alpa", "Total", "%"],
                &rows
            )
        );
        let totals = summary.totals();
        println!(
            "Total {year}: hadir={} izin={} sakit={} alpa={} total={} kehadiran={}%",
            totals.counts.present,
            totals.counts.excused_leave,
            totals.counts.sick,
            totals.counts.absent,
            totals.total,
            totals.percentage
        );
        Ok(())
    }

    fn dashboard(&self) -> Result<(), String> {
        let period = self.current_period()?;
        let month_records = self
            .store
            .records_in_period(&self.user, period)
            .map_err(|e| e.to_string())?;
        let recent = self
            .store
            .recent_records(&self.user, self.config.streak_window)
            .map_err(|e| e.to_string())?;
        let snapshot = dashboard_snapshot(&month_records, &recent, period, self.config.alpa_limit)
            .map_err(|e| e.to_string())?;
        println!(
            "Periode {}: hadir {}/{} ({}%), streak {}",
            snapshot.period, snapshot.present, snapshot.total, snapshot.percentage, snapshot.streak
        );
        if snapshot.absent > 0 {
            println!(
                "Alpa {} dari {}; sisa {}",
                snapshot.absent, snapshot.alpa_limit, snapshot.alpa_remaining
            );
        }
        Ok(())
    }

    fn export<'a>(&self, mut parts: impl Iterator<Item = &'a str>) -> Result<(), String> {
        let usage = "Usage: export <csv|xlsx> <path> [YYYY-MM]";
        let (Some(kind), Some(path)) = (parts.next(), parts.next()) else {
            return Err(usage.to_string());
        };
        let period = match parts.next() {
            Some(p) => p.parse::<Period>().map_err(|e| e.to_string())?,
            None => self.current_period()?,
        };
        let filter = RecordFilter {
            period: Some(period),
            ..RecordFilter::default()
        };
        let records = filter.apply(&self.records()?);
        match kind {
            "csv" => write_delimited_text(&records, path).map_err(|e| e.to_string())?,
            "xlsx" => write_spreadsheet(&records, path).map_err(|e| e.to_string())?,
            _ => return Err(usage.to_string()),
        }
        let suggested = if kind == "csv" {
            csv_filename(period)
        } else {
            XLSX_FILENAME.to_string()
        };
        println!(
            "Exported {} records to {path} (download name {suggested}).",
            records.len()
        );
        Ok(())
    }

    fn save_or_load<'a>(&self, cmd: &str, mut parts: impl Iterator<Item = &'a str>) -> Result<(), String> {
        let (Some("json"), Some(path)) = (parts.next(), parts.next()) else {
            return Err(format!("Usage: {cmd} json <path>"));
        };
        if cmd == "save" {
            let records = self.records()?;
            save_records_to_json(&records, path).map_err(|e| e.to_string())?;
            println!("Saved {} records to {path}.", records.len());
        } else {
            let records = load_records_from_json(path).map_err(|e| e.to_string())?;
            let count = self.store.import_records(&records).map_err(|e| e.to_string())?;
            println!("Records loaded from {path}: {count}.");
        }
        Ok(())
    }

    fn dispatch(&self, input: &str) -> Result<(), String> {
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        match cmd {
            "help" => {
                print_help();
                Ok(())
            }
            "today" => self.show_today(),
            "jadwal" => self.show_timetable(parts.next()),
            "range" => {
                let (Some(year), Some(month)) = (parts.next(), parts.next()) else {
                    return Err("Usage: range <year> <month>".into());
                };
                let year: i32 = year.parse().map_err(|_| "Invalid year".to_string())?;
                let month: u32 = month.parse().map_err(|_| "Invalid month".to_string())?;
                let (start, end) = month_range(year, month).map_err(|e| e.to_string())?;
                println!(
                    "{start} .. {end} ({} s.d. {})",
                    format_display_date(start, DEFAULT_DISPLAY_PATTERN).map_err(|e| e.to_string())?,
                    format_display_date(end, DEFAULT_DISPLAY_PATTERN).map_err(|e| e.to_string())?
                );
                Ok(())
            }
            "absen" => self.absen(parts),
            "quick" => self.quick(parts),
            "riwayat" => self.history(parts),
            "stats" => {
                let (Some(year), Some(month)) = (parts.next(), parts.next()) else {
                    return Err("Usage: stats <year> <month>".into());
                };
                let year: i32 = year.parse().map_err(|_| "Invalid year".to_string())?;
                let month: u32 = month.parse().map_err(|_| "Invalid month".to_string())?;
                self.stats(year, month)
            }
            "rekap" => {
                let year = match parts.next() {
                    Some(y) => y.parse::<i32>().map_err(|_| "Invalid year".to_string())?,
                    None => self.current_period()?.year(),
                };
                self.recap(year)
            }
            "dashboard" => self.dashboard(),
            "export" => self.export(parts),
            "save" | "load" => self.save_or_load(cmd, parts),
            other => Err(format!("Unknown command '{other}'. Type 'help'.")),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(AppConfig::load) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            eprintln!("Config error: {e}");
            std::process::exit(2);
        }
        None => AppConfig::default(),
    };
    let store = match cli.db.as_deref() {
        Some(path) => SqliteAttendanceStore::new(path),
        None => SqliteAttendanceStore::in_memory(),
    };
    let store = match store {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Store error: {e}");
            std::process::exit(2);
        }
    };
    let shell = Shell {
        config,
        store,
        user: cli.user,
    };

    println!("Absensi Kajian (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "quit" | "exit") {
            break;
        }
        if let Err(message) = shell.dispatch(input) {
            println!("{message}");
        }
    }
}
