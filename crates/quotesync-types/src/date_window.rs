//! Fetch window date arithmetic.
//!
//! Windows are expressed in calendar days and converted to Unix seconds at
//! midnight UTC. The end bound of every window is trimmed back to the last
//! trading day (Monday through Friday) before conversion; no holiday calendar
//! is modeled.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::DateWindowError;

/// Date format used for textual dates throughout quotesync.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the default first date of a full history download (2000-01-01).
#[must_use]
pub fn default_epoch_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date")
}

/// A value accepted by [`to_epoch_seconds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput<'a> {
    /// An already-numeric Unix timestamp, passed through unchanged.
    Timestamp(i64),
    /// A calendar date.
    Date(NaiveDate),
    /// Text holding either a run of ASCII digits or a `YYYY-MM-DD` date.
    Text(&'a str),
}

impl From<i64> for DateInput<'_> {
    fn from(ts: i64) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for DateInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text.as_str())
    }
}

/// Converts a date or timestamp to Unix seconds.
///
/// Numeric input passes through unchanged. Dates map to 00:00:00 UTC of that
/// day.
///
/// # Errors
///
/// Returns [`DateWindowError::InvalidDateFormat`] if text input is neither
/// all digits nor a `YYYY-MM-DD` date.
///
/// # Example
///
/// ```
/// use quotesync_types::to_epoch_seconds;
///
/// assert_eq!(to_epoch_seconds("2000-01-01").unwrap(), 946_684_800);
/// assert_eq!(to_epoch_seconds("946684800").unwrap(), 946_684_800);
/// assert_eq!(to_epoch_seconds(946_684_800_i64).unwrap(), 946_684_800);
/// ```
pub fn to_epoch_seconds<'a>(input: impl Into<DateInput<'a>>) -> Result<i64, DateWindowError> {
    match input.into() {
        DateInput::Timestamp(ts) => Ok(ts),
        DateInput::Date(date) => Ok(midnight_utc(date)),
        DateInput::Text(text) => parse_text(text),
    }
}

fn parse_text(text: &str) -> Result<i64, DateWindowError> {
    let invalid = || DateWindowError::InvalidDateFormat {
        input: text.to_string(),
    };
    let trimmed = text.trim();

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse().map_err(|_| invalid());
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(midnight_utc)
        .map_err(|_| invalid())
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::default()).and_utc().timestamp()
}

/// Returns true if the date is a weekday.
#[must_use]
pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Steps back from a weekend date to the preceding Friday.
///
/// Weekdays are returned unchanged.
#[must_use]
pub fn last_trading_day(date: NaiveDate) -> NaiveDate {
    let mut current = date;
    while !is_trading_day(current) {
        match current.pred_opt() {
            Some(previous) => current = previous,
            None => break,
        }
    }
    current
}

/// A non-empty date range to request from a remote source.
///
/// The end bound is always a trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    start: NaiveDate,
    end: NaiveDate,
    start_ts: i64,
    end_ts: i64,
}

impl FetchWindow {
    /// Creates a window from `start` to the last trading day on or before `end`.
    ///
    /// # Errors
    ///
    /// Returns [`DateWindowError::EmptyRange`] if the start timestamp is not
    /// strictly before the trimmed end timestamp.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateWindowError> {
        let end = last_trading_day(end);
        let start_ts = midnight_utc(start);
        let end_ts = midnight_utc(end);

        if start_ts >= end_ts {
            return Err(DateWindowError::EmptyRange { start, end });
        }

        Ok(Self {
            start,
            end,
            start_ts,
            end_ts,
        })
    }

    /// Returns the first date of the window.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last date of the window (always a trading day).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns the start bound in Unix seconds.
    #[must_use]
    pub const fn start_timestamp(&self) -> i64 {
        self.start_ts
    }

    /// Returns the end bound in Unix seconds.
    #[must_use]
    pub const fn end_timestamp(&self) -> i64 {
        self.end_ts
    }
}

impl std::fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_epoch_from_date_string() {
        assert_eq!(to_epoch_seconds("2000-01-01").unwrap(), 946_684_800);
        assert_eq!(to_epoch_seconds(" 2024-01-05 ").unwrap(), 1_704_412_800);
    }

    #[test]
    fn test_epoch_numeric_passthrough() {
        let ts = to_epoch_seconds("2000-01-01").unwrap();
        assert_eq!(to_epoch_seconds(ts).unwrap(), ts);
        assert_eq!(to_epoch_seconds(ts.to_string().as_str()).unwrap(), ts);
    }

    #[test]
    fn test_epoch_from_naive_date() {
        assert_eq!(to_epoch_seconds(date(2000, 1, 1)).unwrap(), 946_684_800);
    }

    #[test]
    fn test_epoch_invalid_format() {
        for input in ["", "yesterday", "2024/01/05", "2024-13-01", "-5"] {
            assert!(
                matches!(
                    to_epoch_seconds(input),
                    Err(DateWindowError::InvalidDateFormat { .. })
                ),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_last_trading_day_weekdays_are_fixed_points() {
        // 2024-01-01 is a Monday
        for day in 1..=5 {
            let d = date(2024, 1, day);
            assert_eq!(last_trading_day(d), d);
        }
    }

    #[test]
    fn test_last_trading_day_weekend() {
        let friday = date(2024, 1, 5);
        assert_eq!(last_trading_day(date(2024, 1, 6)), friday);
        assert_eq!(last_trading_day(date(2024, 1, 7)), friday);
    }

    #[test]
    fn test_is_trading_day() {
        assert!(is_trading_day(date(2024, 1, 5)));
        assert!(!is_trading_day(date(2024, 1, 6)));
        assert!(!is_trading_day(date(2024, 1, 7)));
    }

    #[test]
    fn test_window_trims_end_to_trading_day() {
        let window = FetchWindow::new(default_epoch_start(), date(2024, 1, 7)).unwrap();
        assert_eq!(window.start(), date(2000, 1, 1));
        assert_eq!(window.end(), date(2024, 1, 5));
        assert_eq!(window.start_timestamp(), 946_684_800);
        assert_eq!(window.end_timestamp(), 1_704_412_800);
        assert_eq!(window.to_string(), "2000-01-01..2024-01-05");
    }

    #[test]
    fn test_window_empty_when_start_reaches_end() {
        let friday = date(2024, 1, 5);
        let err = FetchWindow::new(friday, date(2024, 1, 7)).unwrap_err();
        assert_eq!(
            err,
            DateWindowError::EmptyRange {
                start: friday,
                end: friday
            }
        );
        assert!(err.is_empty_range());
    }

    #[test]
    fn test_window_empty_when_start_after_end() {
        let result = FetchWindow::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(DateWindowError::EmptyRange { .. })));
    }
}
