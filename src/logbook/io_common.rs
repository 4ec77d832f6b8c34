use std::fmt::Display;
use std::path::Path;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::logbook::*;

pub const YES: &str = "Oui";
pub const NO: &str = "Non";

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn is_excel_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false)
}

/// An unanswered question is rendered as a no.
pub fn yes_no(answer: Option<bool>) -> &'static str {
    if answer == Some(true) {
        YES
    } else {
        NO
    }
}

/// The submission date in the French calendar format (dd/mm/yyyy), as seen
/// in the given time zone.
pub fn french_date<Tz: TimeZone>(date: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    date.with_timezone(tz).format("%d/%m/%Y").to_string()
}

pub fn export_file_name(export_date: NaiveDate) -> String {
    format!("export_{}.csv", export_date.format("%Y-%m-%d"))
}

pub fn parse_date(value: &str) -> LogbookResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").context(InvalidDateSnafu { value })
}

/// The start date of a roster row: the given date, or the study start date
/// when the cell is empty.
pub fn start_date_or(value: Option<&String>, default: NaiveDate) -> LogbookResult<NaiveDate> {
    match value.map(|s| s.trim()) {
        None | Some("") => Ok(default),
        Some(s) => parse_date(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn names() {
        assert_eq!(simplify_file_name("/tmp/rosters/march.csv"), "march.csv");
        assert!(is_excel_file("/tmp/Roster.XLSX"));
        assert!(!is_excel_file("/tmp/roster.csv"));
        let d = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap();
        assert_eq!(export_file_name(d), "export_2025-12-06.csv");
    }

    #[test]
    fn formats() {
        assert_eq!(yes_no(Some(true)), "Oui");
        assert_eq!(yes_no(Some(false)), "Non");
        assert_eq!(yes_no(None), "Non");
        let t = Utc.with_ymd_and_hms(2025, 1, 9, 23, 0, 0).unwrap();
        assert_eq!(french_date(&t, &Utc), "09/01/2025");
    }

    #[test]
    fn dates_follow_the_time_zone() {
        // 00:30 in Paris on the 7th
        let t = Utc.with_ymd_and_hms(2025, 12, 6, 23, 30, 0).unwrap();
        let paris = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(french_date(&t, &paris), "07/12/2025");
        assert_eq!(french_date(&t, &Utc), "06/12/2025");
        let montreal = FixedOffset::west_opt(5 * 3600).unwrap();
        let early = Utc.with_ymd_and_hms(2025, 12, 7, 2, 0, 0).unwrap();
        assert_eq!(french_date(&early, &montreal), "06/12/2025");
    }

    #[test]
    fn start_dates() {
        let default = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap();
        assert_eq!(start_date_or(None, default).unwrap(), default);
        assert_eq!(start_date_or(Some(&" ".to_string()), default).unwrap(), default);
        assert_eq!(
            start_date_or(Some(&"2026-01-15".to_string()), default).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
        assert!(matches!(
            start_date_or(Some(&"15/01/2026".to_string()), default),
            Err(LogbookError::InvalidDate { .. })
        ));
    }
}
