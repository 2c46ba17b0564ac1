use chrono::{NaiveDate, TimeZone, Utc};
use absensi_kajian::calendar::{jakarta_offset, reference_offset, today_in};
use absensi_kajian::{
    Error, Period, current_period, format_display_date, format_input_date, month_name,
    month_range, parse_input_date,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn february_respects_leap_years() {
    assert_eq!(month_range(2024, 2).unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
    assert_eq!(month_range(2025, 2).unwrap(), (d(2025, 2, 1), d(2025, 2, 28)));
    assert_eq!(month_range(1900, 2).unwrap().1, d(1900, 2, 28));
    assert_eq!(month_range(2000, 2).unwrap().1, d(2000, 2, 29));
}

#[test]
fn every_month_range_stays_inside_its_month() {
    for year in [2023, 2024, 2025, 2026] {
        for month in 1..=12 {
            let (start, end) = month_range(year, month).unwrap();
            assert!(start <= end);
            assert_eq!(start, d(year, month, 1));
            assert_eq!(Period::of(end), Period::new(year, month).unwrap());
            assert_ne!(Period::of(end.succ_opt().unwrap()), Period::of(end));
        }
    }
    assert_eq!(month_range(2025, 12).unwrap().1, d(2025, 12, 31));
    assert_eq!(month_range(2025, 4).unwrap().1, d(2025, 4, 30));
}

#[test]
fn out_of_range_month_fails() {
    assert!(matches!(month_range(2025, 0), Err(Error::InvalidArgument(_))));
    assert!(matches!(month_range(2025, 13), Err(Error::InvalidArgument(_))));
    assert!(month_name(13).is_err());
    assert!(Period::new(2025, 0).is_err());
}

#[test]
fn current_period_uses_reference_zone() {
    // 17:30 UTC on 31 Jan is already 1 Feb in Jakarta
    let now = Utc.with_ymd_and_hms(2025, 1, 31, 17, 30, 0).unwrap();
    let period = current_period(now, jakarta_offset());
    assert_eq!(period, Period::new(2025, 2).unwrap());
    assert_eq!(today_in(now, jakarta_offset()), d(2025, 2, 1));

    let utc = reference_offset(0).unwrap();
    assert_eq!(current_period(now, utc), Period::new(2025, 1).unwrap());
}

#[test]
fn display_dates_use_indonesian_names() {
    let date = d(2025, 8, 17);
    assert_eq!(format_display_date(date, "%d %B %Y").unwrap(), "17 Agustus 2025");
    assert_eq!(format_display_date(date, "%d %b %Y").unwrap(), "17 Agt 2025");
    assert_eq!(format_display_date(date, "%A").unwrap(), "Ahad");
    assert_eq!(format_display_date(date, "%d/%m/%Y").unwrap(), "17/08/2025");
}

#[test]
fn invalid_display_pattern_fails() {
    assert!(format_display_date(d(2025, 1, 1), "%Q").is_err());
    assert!(format_display_date(d(2025, 1, 1), "trailing %").is_err());
}

#[test]
fn input_dates_round_trip() {
    let date = d(2025, 3, 7);
    assert_eq!(format_input_date(date), "2025-03-07");
    assert_eq!(parse_input_date("2025-03-07").unwrap(), date);
    assert!(matches!(parse_input_date("07/03/2025"), Err(Error::InvalidArgument(_))));
    assert!(parse_input_date("2025-02-30").is_err());
}

#[test]
fn month_names_are_one_indexed() {
    assert_eq!(month_name(1).unwrap(), "Januari");
    assert_eq!(month_name(5).unwrap(), "Mei");
    assert_eq!(month_name(12).unwrap(), "Desember");
}

#[test]
fn period_parses_month_picker_values() {
    let period: Period = "2025-03".parse().unwrap();
    assert_eq!(period.year(), 2025);
    assert_eq!(period.month(), 3);
    assert_eq!(period.to_string(), "2025-03");
    assert!(period.contains(d(2025, 3, 31)));
    assert!(!period.contains(d(2025, 4, 1)));
    assert!("2025-13".parse::<Period>().is_err());
    assert!("March".parse::<Period>().is_err());
}
