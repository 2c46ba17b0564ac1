pub mod attendance;
pub mod calendar;
pub mod config;
pub mod error;
pub mod export;
pub mod persistence;
pub(crate) mod record_validation;
pub mod schedule;
pub mod stats;

pub use attendance::{
    AttendanceDraft, AttendanceRecord, AttendanceStatus, RecordFilter, photo_storage_path,
};
pub use calendar::{
    DateFormatter, IndonesianFormatter, Period, current_period, format_display_date,
    format_input_date, month_name, month_range, parse_input_date,
};
pub use config::{AppConfig, ConfigError};
pub use error::{Error, Result};
pub use export::{
    ExportError, csv_filename, to_delimited_text, to_spreadsheet, write_delimited_text,
    write_spreadsheet,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteAttendanceStore;
pub use persistence::{
    AttendanceStore, PersistenceError, load_records_from_json, save_records_to_json,
};
pub use record_validation::RecordValidationError;
pub use schedule::{
    DayName, SCHEDULES, ScheduleEntry, Session, TodaySchedules, day_name_from_date, lookup,
    today_schedules,
};
pub use stats::{
    DashboardSnapshot, MonthlyStats, StatusCounts, YearSummary, YearTotals, alpa_warning,
    dashboard_snapshot, monthly_stats, streak, year_summary,
};
