mod config;
pub mod builder;
pub mod manual;
pub mod stats;

use chrono::{Datelike, Days, NaiveDate};
use log::debug;

use std::collections::HashMap;

pub use crate::config::*;

const FRENCH_MONTHS: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

/// One cell of the calendar of a participant.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub status: DayStatus,
}

/// The 28-day calendar of one participant, as seen on a given day.
///
/// `today` is always provided by the caller, so that the same calendar can be
/// replayed for any date.
///
/// ```
/// use chrono::NaiveDate;
/// use study_logbook::{Calendar, DayStatus};
///
/// let start = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap();
/// let today = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();
/// let calendar = Calendar::new(start, today, &[]);
///
/// assert_eq!(calendar.days_since_start(), 3);
/// assert_eq!(calendar.status(1)?, DayStatus::Missed);
/// assert_eq!(calendar.status(3)?, DayStatus::Current);
/// assert_eq!(calendar.status(4)?, DayStatus::Future);
/// # Ok::<(), study_logbook::LogbookErrors>(())
/// ```
pub struct Calendar<'a> {
    start_date: NaiveDate,
    today: NaiveDate,
    // Only the entries of this participant, indexed by day.
    entries: HashMap<u32, &'a Entry>,
}

impl<'a> Calendar<'a> {
    /// Builds the calendar from the entries of a single participant.
    pub fn new(start_date: NaiveDate, today: NaiveDate, entries: &'a [Entry]) -> Calendar<'a> {
        let mut cal = Calendar {
            start_date,
            today,
            entries: HashMap::new(),
        };
        for e in entries.iter() {
            cal.add_entry(e);
        }
        cal
    }

    /// Builds the calendar of a participant, picking their entries out of the
    /// full collection.
    pub fn for_participant(
        participant: &Participant,
        settings: &Settings,
        today: NaiveDate,
        all_entries: &'a [Entry],
    ) -> Calendar<'a> {
        let start_date = participant.start_date_or(settings);
        let mut cal = Calendar::new(start_date, today, &[]);
        for e in all_entries
            .iter()
            .filter(|e| e.participant_code == participant.code)
        {
            cal.add_entry(e);
        }
        debug!(
            "for_participant: code: {} start: {} entries: {}",
            participant.code,
            start_date,
            cal.entries.len()
        );
        cal
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// The study day that corresponds to today. Day 1 on the start date,
    /// zero or negative before it.
    pub fn days_since_start(&self) -> i64 {
        (self.today - self.start_date).num_days() + 1
    }

    pub fn status(&self, day: u32) -> Result<DayStatus, LogbookErrors> {
        check_day(day)?;
        if self.entry(day).map(|e| e.is_complete()).unwrap_or(false) {
            return Ok(DayStatus::Completed);
        }
        let current = self.days_since_start();
        let d = day as i64;
        let res = if d > current {
            DayStatus::Future
        } else if d == current {
            DayStatus::Current
        } else {
            DayStatus::Missed
        };
        Ok(res)
    }

    /// The entry recorded for this day, complete or draft.
    pub fn entry(&self, day: u32) -> Option<&'a Entry> {
        self.entries.get(&day).copied()
    }

    /// The calendar date of a study day. Only used for display.
    pub fn date_for_day(&self, day: u32) -> Result<NaiveDate, LogbookErrors> {
        check_day(day)?;
        Ok(self.start_date + Days::new((day - 1) as u64))
    }

    /// All the days of the study, in order.
    pub fn days(&self) -> Vec<CalendarDay> {
        (1..=STUDY_DAYS)
            .map(|day| CalendarDay {
                day,
                date: self.start_date + Days::new((day - 1) as u64),
                status: self.day_status_unchecked(day),
            })
            .collect()
    }

    pub fn completed_days(&self) -> u32 {
        self.entries
            .iter()
            .filter(|(day, e)| (1..=STUDY_DAYS).contains(*day) && e.is_complete())
            .count() as u32
    }

    pub fn completion_percent(&self) -> u32 {
        completion_percent(self.completed_days(), STUDY_DAYS)
    }

    // Keeps a complete entry over a draft if both are present for a day.
    fn add_entry(&mut self, e: &'a Entry) {
        match self.entries.get(&e.day) {
            Some(prev) if prev.is_complete() => {}
            _ => {
                self.entries.insert(e.day, e);
            }
        }
    }

    fn day_status_unchecked(&self, day: u32) -> DayStatus {
        self.status(day).unwrap_or(DayStatus::Future)
    }
}

/// Fails with `InvalidDay` unless the day is within the study window.
pub fn check_day(day: u32) -> Result<(), LogbookErrors> {
    if day == 0 || day > STUDY_DAYS {
        return Err(LogbookErrors::InvalidDay(day));
    }
    Ok(())
}

/// `round(completed / total * 100)`, and 0 when there is nothing to complete.
pub fn completion_percent(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64) / (total as f64) * 100.0).round() as u32
}

/// The short label of a date in the calendar, for example `6 déc.`
pub fn day_label(date: NaiveDate) -> String {
    format!("{} {}", date.day(), FRENCH_MONTHS[date.month0() as usize])
}
