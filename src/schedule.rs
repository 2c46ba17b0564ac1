//! The fixed weekly kajian timetable.
//!
//! Each weekday carries either a morning (05.00) or an evening (20.00)
//! session, sometimes both. The table is literal data: no rule generates it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Weekday labels as used by the group, Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayName {
    Ahad,
    Senin,
    Selasa,
    Rabu,
    Kamis,
    Jumat,
    Sabtu,
}

impl DayName {
    /// Indexed by `Weekday::num_days_from_sunday`.
    pub const ALL: [DayName; 7] = [
        DayName::Ahad,
        DayName::Senin,
        DayName::Selasa,
        DayName::Rabu,
        DayName::Kamis,
        DayName::Jumat,
        DayName::Sabtu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayName::Ahad => "Ahad",
            DayName::Senin => "Senin",
            DayName::Selasa => "Selasa",
            DayName::Rabu => "Rabu",
            DayName::Kamis => "Kamis",
            DayName::Jumat => "Jumat",
            DayName::Sabtu => "Sabtu",
        }
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        DayName::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::invalid(format!("unknown day name '{trimmed}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    Morning,
    Evening,
}

impl Session {
    pub const ALL: [Session; 2] = [Session::Morning, Session::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Morning => "morning",
            Session::Evening => "evening",
        }
    }

    /// Indonesian display label.
    pub fn label(&self) -> &'static str {
        match self {
            Session::Morning => "Pagi",
            Session::Evening => "Malam",
        }
    }

    /// Session a quick check-in defaults to at the given local hour.
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Session::Morning
        } else {
            Session::Evening
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Session {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" | "pagi" => Ok(Session::Morning),
            "evening" | "malam" => Ok(Session::Evening),
            other => Err(Error::invalid(format!("unknown session '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub day: DayName,
    pub session: Session,
    pub subject: &'static str,
    pub teacher: &'static str,
    /// Student coordinating the session (PJ).
    pub responsible_person: &'static str,
    /// Display-only clock label.
    pub time: &'static str,
}

const fn entry(
    day: DayName,
    session: Session,
    time: &'static str,
    subject: &'static str,
    teacher: &'static str,
    responsible_person: &'static str,
) -> ScheduleEntry {
    ScheduleEntry {
        day,
        session,
        subject,
        teacher,
        responsible_person,
        time,
    }
}

pub static SCHEDULES: [ScheduleEntry; 12] = [
    entry(DayName::Senin, Session::Morning, "05.00", "Psikologi Agama", "ustadzah Niha", "Alvia"),
    entry(DayName::Selasa, Session::Morning, "05.00", "Fathul Mu'in", "aba Yahya", "Silvia"),
    entry(DayName::Rabu, Session::Morning, "05.00", "Filsafat Ilmu", "ustadz Husni", "Mela"),
    entry(
        DayName::Kamis,
        Session::Morning,
        "05.00",
        "Manajemen SDM",
        "ustadzah Abil & ustadzah Indah",
        "Sofia",
    ),
    entry(DayName::Jumat, Session::Morning, "05.00", "Ilmu Kalam", "ustadz Mahbub", "Salisa"),
    entry(
        DayName::Sabtu,
        Session::Morning,
        "05.00",
        "Safinatun Najah",
        "ustadzah Azizah & ustadzah Fitri",
        "Ina",
    ),
    entry(DayName::Ahad, Session::Evening, "20.00", "Ihya' Ulumuddin", "aba Djoko", "Yusrin"),
    entry(
        DayName::Senin,
        Session::Evening,
        "20.00",
        "Filsafat Pendidikan Islam",
        "ustadzah Ani",
        "Hibatin",
    ),
    entry(DayName::Selasa, Session::Evening, "20.00", "Riyadhus Sholihin", "aba Yahya", "Yusrin"),
    entry(
        DayName::Rabu,
        Session::Evening,
        "20.00",
        "Sejarah Peradaban Islam",
        "ustadz Ulil & ustadzah Mida",
        "Amina",
    ),
    entry(
        DayName::Kamis,
        Session::Evening,
        "20.00",
        "Tafsir Jallalain & Istighotsah",
        "aba Djoko",
        "Yusrin",
    ),
    entry(
        DayName::Jumat,
        Session::Evening,
        "20.00",
        "Qurrotul 'Uyun",
        "ustadz Huda & ustadzah Idhoh",
        "Nisrina",
    ),
];

/// The sessions held on one day. Either side may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TodaySchedules {
    pub morning: Option<&'static ScheduleEntry>,
    pub evening: Option<&'static ScheduleEntry>,
}

impl TodaySchedules {
    pub fn get(&self, session: Session) -> Option<&'static ScheduleEntry> {
        match session {
            Session::Morning => self.morning,
            Session::Evening => self.evening,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.morning.is_none() && self.evening.is_none()
    }
}

pub fn lookup(day: DayName, session: Session) -> Option<&'static ScheduleEntry> {
    SCHEDULES
        .iter()
        .find(|entry| entry.day == day && entry.session == session)
}

pub fn today_schedules(day: DayName) -> TodaySchedules {
    TodaySchedules {
        morning: lookup(day, Session::Morning),
        evening: lookup(day, Session::Evening),
    }
}

pub fn day_name_from_date(date: NaiveDate) -> DayName {
    DayName::ALL[date.weekday().num_days_from_sunday() as usize]
}

/// All entries for a day in session order.
pub fn entries_for_day(day: DayName) -> impl Iterator<Item = &'static ScheduleEntry> {
    Session::ALL
        .into_iter()
        .filter_map(move |session| lookup(day, session))
}
