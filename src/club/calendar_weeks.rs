//! Fixed four-way partitioning of a calendar month.
//!
//! Weeks 1-3 always cover days 1-7, 8-14 and 15-21. Week 4 starts on the 22nd
//! and absorbs the rest of the month, so it is 7 to 10 days long. Stored films
//! and posts are keyed by this partition, so it must not drift towards ISO
//! weeks or weekday alignment.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use thiserror::Error;

pub const WEEKS_PER_MONTH: u32 = 4;

const DAYS_PER_FIXED_WEEK: u32 = 7;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Week number {0} is outside the range 1-4")]
    InvalidWeekNumber(u32),
    #[error("'{0}' is not a valid month label (expected e.g. 'March 2026')")]
    InvalidMonthLabel(String),
}

/// One of the four partitions of a month, with inclusive day bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarWeek {
    pub week_number: u32,
    pub start_day: u32,
    pub end_day: u32,
}

/// "March 2026". Always English month names, since the label is compared by
/// exact string equality against stored `month_year` values.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Inverse of [`month_label`]: returns the first day of the labelled month.
pub fn parse_month_label(label: &str) -> Result<NaiveDate, CalendarError> {
    let invalid = || CalendarError::InvalidMonthLabel(label.to_string());
    let first_of_month = NaiveDate::parse_from_str(&format!("1 {}", label), "%d %B %Y")
        .map_err(|_| invalid())?;

    // chrono also accepts abbreviations and other casings; only the canonical form is a key.
    if month_label(first_of_month) != label {
        return Err(invalid());
    }
    Ok(first_of_month)
}

pub fn current_week_number(date: NaiveDate) -> u32 {
    match date.day() {
        1..=7 => 1,
        8..=14 => 2,
        15..=21 => 3,
        _ => 4,
    }
}

pub fn last_day_of_month(date: NaiveDate) -> u32 {
    match date.month() {
        2 if NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some() => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn week_date_range(week_number: u32, date: NaiveDate) -> Result<(u32, u32), CalendarError> {
    if !(1..=WEEKS_PER_MONTH).contains(&week_number) {
        return Err(CalendarError::InvalidWeekNumber(week_number));
    }
    let start_day = (week_number - 1) * DAYS_PER_FIXED_WEEK + 1;
    let end_day = if week_number == WEEKS_PER_MONTH {
        last_day_of_month(date)
    } else {
        week_number * DAYS_PER_FIXED_WEEK
    };
    Ok((start_day, end_day))
}

pub fn calendar_week(week_number: u32, date: NaiveDate) -> Result<CalendarWeek, CalendarError> {
    let (start_day, end_day) = week_date_range(week_number, date)?;
    Ok(CalendarWeek { week_number, start_day, end_day })
}

pub fn weeks_of_month(date: NaiveDate) -> [CalendarWeek; 4] {
    let last_day = last_day_of_month(date);
    [
        CalendarWeek { week_number: 1, start_day: 1, end_day: 7 },
        CalendarWeek { week_number: 2, start_day: 8, end_day: 14 },
        CalendarWeek { week_number: 3, start_day: 15, end_day: 21 },
        CalendarWeek { week_number: 4, start_day: 22, end_day: last_day },
    ]
}

/// Header text for a week, e.g. "3/22 - 3/31".
pub fn format_week_range(week_number: u32, date: NaiveDate) -> Result<String, CalendarError> {
    let (start_day, end_day) = week_date_range(week_number, date)?;
    let month = date.month();
    Ok(format!("{}/{} - {}/{}", month, start_day, month, end_day))
}

pub fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    date.with_day(1).unwrap_or(date)
}

/// First day of the month before `date`.
pub fn previous_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first.checked_sub_months(Months::new(1)).unwrap_or(first)
}

/// First day of the month after `date`.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}
