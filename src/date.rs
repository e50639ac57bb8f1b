//! Date-window helpers.
//!
//! Dates travel as fixed-width `YYYY-MM-DD` strings so that plain string
//! comparison orders them chronologically. All functions here are pure;
//! the only clock read is [`now`].

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Canonical date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical time-of-day format
pub const TIME_FORMAT: &str = "%H:%M";

/// Time used for a deadline when the task carries none
pub const END_OF_DAY: &str = "23:59";

/// Strip any time part from a date string: `2024-05-01T10:00:00Z` becomes
/// `2024-05-01`. Empty input stays empty. Idempotent.
pub fn normalize_date(input: &str) -> String {
    let trimmed = input.trim();
    match trimmed.split_once('T') {
        Some((date, _)) => date.to_string(),
        None => trimmed.to_string(),
    }
}

/// Normalized form kept on stored records: `YYYY-MM-DD`, or empty when the
/// input is not a calendar date.
pub fn stored_date(input: &str) -> String {
    NaiveDate::parse_from_str(&normalize_date(input), DATE_FORMAT)
        .map(format_date)
        .unwrap_or_default()
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Current local date and time
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Today's local date as `YYYY-MM-DD`
pub fn today() -> String {
    format_date(now().date())
}

/// Monday..Sunday window, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// Week containing `date`.
    ///
    /// Sunday belongs to the week that is ending: with Sunday=0..Saturday=6,
    /// the offset back to Monday is `(day + 6) % 7`, i.e. 6 on a Sunday.
    pub fn containing(date: NaiveDate) -> Self {
        let day = date.weekday().num_days_from_sunday() as i64;
        let diff_to_monday = (day + 6) % 7;
        let start = date - Duration::days(diff_to_monday);
        let end = start + Duration::days(6);
        Self { start, end }
    }

    pub fn start_str(&self) -> String {
        format_date(self.start)
    }

    pub fn end_str(&self) -> String {
        format_date(self.end)
    }

    /// Whether a normalized `YYYY-MM-DD` string falls inside the window.
    /// Compares strings, not parsed dates.
    pub fn contains(&self, date: &str) -> bool {
        let start = self.start_str();
        let end = self.end_str();
        date >= start.as_str() && date <= end.as_str()
    }
}

/// Week window around the current local date
pub fn current_week() -> WeekWindow {
    WeekWindow::containing(now().date())
}

/// Parse a user-supplied date, accepting a trailing time part.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let normalized = normalize_date(input);
    NaiveDate::parse_from_str(&normalized, DATE_FORMAT).map_err(|_| {
        Error::InvalidArgument(format!("invalid date '{input}' (expected YYYY-MM-DD)"))
    })
}

/// Parse an `HH:MM` time of day.
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map_err(|_| Error::InvalidArgument(format!("invalid time '{input}' (expected HH:MM)")))
}

/// Parse a clock override: `YYYY-MM-DDTHH:MM[:SS]`, or a bare date meaning
/// midnight.
pub fn parse_now(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(value);
        }
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "invalid time '{input}' (expected YYYY-MM-DDTHH:MM or YYYY-MM-DD)"
            ))
        })
}

/// `date + "T" + (time or default_time)` as a local datetime.
///
/// `None` when the date is empty or either part does not parse.
pub fn deadline(date: &str, time: Option<&str>, default_time: &str) -> Option<NaiveDateTime> {
    let date = normalize_date(date);
    if date.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).ok()?;
    let time = match time.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => NaiveTime::parse_from_str(value, TIME_FORMAT).ok()?,
        None => NaiveTime::parse_from_str(default_time, TIME_FORMAT).ok()?,
    };
    Some(date.and_time(time))
}
