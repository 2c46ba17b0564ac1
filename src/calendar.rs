use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::schedule::{DayName, day_name_from_date};

/// Asia/Jakarta (WIB) has been UTC+07:00 without DST since 1964.
pub const JAKARTA_UTC_OFFSET_HOURS: i32 = 7;

pub const INPUT_DATE_PATTERN: &str = "%Y-%m-%d";
pub const DEFAULT_DISPLAY_PATTERN: &str = "%d %B %Y";

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agt", "Sep", "Okt", "Nov", "Des",
];

const DAY_ABBREVIATIONS: [&str; 7] = ["Ahd", "Sen", "Sel", "Rab", "Kam", "Jum", "Sab"];

/// A (year, month) aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        validate_month(month)?;
        // Rejects years chrono cannot represent.
        first_of_month(year, month)?;
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn range(&self) -> Result<(NaiveDate, NaiveDate)> {
        month_range(self.year, self.month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = Error;

    /// Parses the `YYYY-MM` form produced by month pickers.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| Error::invalid(format!("invalid period '{trimmed}', expected YYYY-MM")))?;
        let year = year
            .parse::<i32>()
            .map_err(|e| Error::invalid(format!("invalid year in period '{trimmed}': {e}")))?;
        let month = month
            .parse::<u32>()
            .map_err(|e| Error::invalid(format!("invalid month in period '{trimmed}': {e}")))?;
        Period::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Locale hook for display formatting. Patterns are strftime patterns; the
/// month and weekday name specifiers (`%B %b %h %A %a`, also inside `%v` and
/// `%c`) are rendered by the implementor. A `-`, `_` or `0` flag on a name is
/// accepted and ignored; `^` uppercases it.
pub trait DateFormatter {
    fn month_name(&self, month: u32) -> Result<&'static str>;
    fn month_abbreviation(&self, month: u32) -> Result<&'static str>;
    fn day_name(&self, day: DayName) -> &'static str;
    fn day_abbreviation(&self, day: DayName) -> &'static str;

    fn format(&self, date: NaiveDate, pattern: &str) -> Result<String> {
        let mut localized = String::with_capacity(pattern.len() + 16);
        localize_pattern(self, date, pattern, &mut localized)?;

        let items = StrftimeItems::new(&localized);
        if items.clone().any(|item| matches!(item, Item::Error)) {
            return Err(Error::invalid(format!("invalid date pattern '{pattern}'")));
        }
        let mut out = String::new();
        write!(out, "{}", date.format_with_items(items)).map_err(|_| {
            Error::invalid(format!(
                "date pattern '{pattern}' needs fields a calendar date does not have"
            ))
        })?;
        Ok(out)
    }
}

/// Replaces name specifiers with escaped literals; everything else is left
/// for chrono, which rejects what it does not know.
fn localize_pattern<F: DateFormatter + ?Sized>(
    formatter: &F,
    date: NaiveDate,
    pattern: &str,
    out: &mut String,
) -> Result<()> {
    let day = day_name_from_date(date);
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        let flag = chars.next_if(|c| matches!(*c, '-' | '_' | '0' | '^'));
        let Some(spec) = chars.next() else {
            out.push('%');
            out.extend(flag);
            break;
        };
        let expansion = match spec {
            'v' => Some("%e-%b-%Y"),
            'c' => Some("%a %b %e %H:%M:%S %Y"),
            _ => None,
        };
        if let Some(expansion) = expansion {
            if let Some(flag) = flag {
                return Err(Error::invalid(format!(
                    "flag '{flag}' is not supported on %{spec}"
                )));
            }
            localize_pattern(formatter, date, expansion, out)?;
            continue;
        }
        let name = match spec {
            'B' => Some(formatter.month_name(date.month())?),
            'b' | 'h' => Some(formatter.month_abbreviation(date.month())?),
            'A' => Some(formatter.day_name(day)),
            'a' => Some(formatter.day_abbreviation(day)),
            _ => None,
        };
        match (name, flag) {
            (Some(name), Some('^')) => push_literal(out, &name.to_uppercase()),
            (Some(name), _) => push_literal(out, name),
            (None, _) => {
                out.push('%');
                out.extend(flag);
                out.push(spec);
            }
        }
    }
    Ok(())
}

fn push_literal(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
    }
}

/// Indonesian month and weekday names. Weekdays use the group's labels, so
/// Sunday is "Ahad".
#[derive(Debug, Clone, Copy, Default)]
pub struct IndonesianFormatter;

impl DateFormatter for IndonesianFormatter {
    fn month_name(&self, month: u32) -> Result<&'static str> {
        validate_month(month)?;
        Ok(MONTH_NAMES[(month - 1) as usize])
    }

    fn month_abbreviation(&self, month: u32) -> Result<&'static str> {
        validate_month(month)?;
        Ok(MONTH_ABBREVIATIONS[(month - 1) as usize])
    }

    fn day_name(&self, day: DayName) -> &'static str {
        day.as_str()
    }

    fn day_abbreviation(&self, day: DayName) -> &'static str {
        let idx = DayName::ALL
            .iter()
            .position(|candidate| *candidate == day)
            .unwrap_or_default();
        DAY_ABBREVIATIONS[idx]
    }
}

fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(Error::invalid(format!(
            "month {month} is out of range (expected 1-12)"
        )));
    }
    Ok(())
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::invalid(format!("year {year} is out of range")))
}

/// Builds the reference zone offset from whole hours east of UTC.
pub fn reference_offset(hours: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| Error::invalid(format!("utc offset {hours}h is out of range")))
}

pub fn jakarta_offset() -> FixedOffset {
    FixedOffset::east_opt(JAKARTA_UTC_OFFSET_HOURS * 3600).expect("UTC+07:00 is a valid offset")
}

/// Calendar date at `now` in the reference zone.
pub fn today_in(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Period containing `now` as seen from the reference zone, regardless of the
/// caller's own zone.
pub fn current_period(now: DateTime<Utc>, offset: FixedOffset) -> Period {
    Period::of(today_in(now, offset))
}

/// Inclusive first and last day of the month.
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    validate_month(month)?;
    let start = first_of_month(year, month)?;
    let next_start = if month == 12 {
        first_of_month(year + 1, 1)?
    } else {
        first_of_month(year, month + 1)?
    };
    let end = next_start
        .pred_opt()
        .ok_or_else(|| Error::invalid(format!("no last day for {year}-{month:02}")))?;
    Ok((start, end))
}

pub fn format_display_date(date: NaiveDate, pattern: &str) -> Result<String> {
    IndonesianFormatter.format(date, pattern)
}

pub fn format_input_date(date: NaiveDate) -> String {
    date.format(INPUT_DATE_PATTERN).to_string()
}

pub fn parse_input_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), INPUT_DATE_PATTERN)
        .map_err(|e| Error::invalid(format!("invalid date '{input}': {e}")))
}

pub fn month_name(month: u32) -> Result<&'static str> {
    IndonesianFormatter.month_name(month)
}
