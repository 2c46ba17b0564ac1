//! Monthly and yearly attendance aggregation.

use serde::{Deserialize, Serialize};

use crate::attendance::{AttendanceRecord, AttendanceStatus};
use crate::calendar::{Period, month_name, month_range};
use crate::error::Result;

/// Monthly alpa allowance observed in practice.
pub const DEFAULT_ALPA_LIMIT: u32 = 8;

/// How many recent records the streak looks at by default.
pub const DEFAULT_STREAK_WINDOW: usize = 10;

/// `present / total * 100` rounded half away from zero; 0 when `total` is 0.
pub fn attendance_percentage(present: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let present = u64::from(present);
    let total = u64::from(total);
    ((present * 200 + total) / (total * 2)) as u32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub present: u32,
    pub excused_leave: u32,
    pub sick: u32,
    pub absent: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::ExcusedLeave => self.excused_leave += 1,
            AttendanceStatus::Sick => self.sick += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }

    pub fn get(&self, status: AttendanceStatus) -> u32 {
        match status {
            AttendanceStatus::Present => self.present,
            AttendanceStatus::ExcusedLeave => self.excused_leave,
            AttendanceStatus::Sick => self.sick,
            AttendanceStatus::Absent => self.absent,
        }
    }

    pub fn total(&self) -> u32 {
        self.present + self.excused_leave + self.sick + self.absent
    }

    pub fn percentage(&self) -> u32 {
        attendance_percentage(self.present, self.total())
    }

    fn add(&mut self, other: &StatusCounts) {
        self.present += other.present;
        self.excused_leave += other.excused_leave;
        self.sick += other.sick;
        self.absent += other.absent;
    }
}

impl<'a> FromIterator<&'a AttendanceRecord> for StatusCounts {
    fn from_iter<T: IntoIterator<Item = &'a AttendanceRecord>>(iter: T) -> Self {
        let mut counts = StatusCounts::default();
        for record in iter {
            counts.record(record.status);
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub period: Period,
    pub month_name: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total: u32,
    pub percentage: u32,
}

impl MonthlyStats {
    fn from_counts(period: Period, counts: StatusCounts) -> Result<Self> {
        Ok(Self {
            period,
            month_name: month_name(period.month())?.to_string(),
            total: counts.total(),
            percentage: counts.percentage(),
            counts,
        })
    }

    pub fn count(&self, status: AttendanceStatus) -> u32 {
        self.counts.get(status)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Counts the records dated inside the given month. Records outside it are
/// ignored, so callers may pass a user's whole history.
pub fn monthly_stats(records: &[AttendanceRecord], year: i32, month: u32) -> Result<MonthlyStats> {
    let (start, end) = month_range(year, month)?;
    let counts: StatusCounts = records
        .iter()
        .filter(|record| record.date >= start && record.date <= end)
        .collect();
    MonthlyStats::from_counts(Period::new(year, month)?, counts)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearTotals {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    /// Months with at least one record, January first.
    pub months: Vec<MonthlyStats>,
}

impl YearSummary {
    pub fn totals(&self) -> YearTotals {
        let mut counts = StatusCounts::default();
        for stats in &self.months {
            counts.add(&stats.counts);
        }
        YearTotals {
            counts,
            total: counts.total(),
            percentage: counts.percentage(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

pub fn year_summary(records: &[AttendanceRecord], year: i32) -> Result<YearSummary> {
    let mut months = Vec::new();
    for month in 1..=12 {
        let stats = monthly_stats(records, year, month)?;
        if !stats.is_empty() {
            months.push(stats);
        }
    }
    tracing::debug!(year, months = months.len(), "built year summary");
    Ok(YearSummary { year, months })
}

/// Consecutive `Hadir` records at the head of a newest-first list.
///
/// This is only as long as the window the caller fetched (the store returns
/// [`DEFAULT_STREAK_WINDOW`] rows by default), so a streak longer than the
/// window is reported as the window length.
pub fn streak(recent_desc: &[AttendanceRecord]) -> usize {
    recent_desc
        .iter()
        .take_while(|record| record.status == AttendanceStatus::Present)
        .count()
}

/// Alpa absences still allowed this month; never negative.
pub fn alpa_warning(alpa_count: u32, limit: u32) -> u32 {
    limit.saturating_sub(alpa_count)
}

/// Figures shown on the landing screen for the current month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub period: Period,
    pub present: u32,
    pub total: u32,
    pub percentage: u32,
    pub absent: u32,
    pub alpa_limit: u32,
    pub alpa_remaining: u32,
    pub streak: usize,
}

pub fn dashboard_snapshot(
    records: &[AttendanceRecord],
    recent_desc: &[AttendanceRecord],
    period: Period,
    alpa_limit: u32,
) -> Result<DashboardSnapshot> {
    let stats = monthly_stats(records, period.year(), period.month())?;
    let absent = stats.count(AttendanceStatus::Absent);
    Ok(DashboardSnapshot {
        period,
        present: stats.count(AttendanceStatus::Present),
        total: stats.total,
        percentage: stats.percentage,
        absent,
        alpa_limit,
        alpa_remaining: alpa_warning(absent, alpa_limit),
        streak: streak(recent_desc),
    })
}
