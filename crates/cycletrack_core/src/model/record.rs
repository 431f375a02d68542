//! Cycle record domain model.
//!
//! # Responsibility
//! - Define the persisted record for one recorded period start date.
//! - Parse host-provided date input into a calendar date.
//!
//! # Invariants
//! - `date` carries no time component and is unique within a collection.
//! - `timestamp` is derived from `date` at construction and never mutated.
//! - Wire shape is `{"date": "YYYY-MM-DD", "timestamp": <epoch ms>}`.

use chrono::{LocalResult, NaiveDate, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Date format used on the wire and by HTML date inputs.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));

/// Validation error for record date input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Input is empty after trimming.
    EmptyDate,
    /// Input is not shaped like `YYYY-MM-DD`.
    InvalidDateFormat(String),
    /// Input is shaped correctly but names no calendar day (e.g. `2023-02-30`).
    InvalidCalendarDate(String),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDate => write!(f, "date is required"),
            Self::InvalidDateFormat(value) => {
                write!(f, "date `{value}` must use the YYYY-MM-DD format")
            }
            Self::InvalidCalendarDate(value) => write!(f, "date `{value}` does not exist"),
        }
    }
}

impl Error for RecordValidationError {}

/// One recorded period start date plus its derived epoch timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Unix epoch milliseconds at local midnight of `date`.
    pub timestamp: i64,
}

impl CycleRecord {
    /// Creates a record whose timestamp is local midnight of `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            timestamp: local_midnight_millis(date),
        }
    }

    /// Parses raw date input and builds a record from it.
    pub fn from_input(input: &str) -> Result<Self, RecordValidationError> {
        parse_record_date(input).map(Self::new)
    }

    /// Returns the ISO `YYYY-MM-DD` form of the date.
    pub fn date_key(&self) -> String {
        self.date.format(RECORD_DATE_FORMAT).to_string()
    }
}

/// Parses strict `YYYY-MM-DD` input into a calendar date.
///
/// Surrounding whitespace is ignored.
pub fn parse_record_date(input: &str) -> Result<NaiveDate, RecordValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RecordValidationError::EmptyDate);
    }
    if !ISO_DATE_RE.is_match(trimmed) {
        return Err(RecordValidationError::InvalidDateFormat(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, RECORD_DATE_FORMAT)
        .map_err(|_| RecordValidationError::InvalidCalendarDate(trimmed.to_string()))
}

/// Returns epoch milliseconds of local midnight on `date`.
///
/// When midnight falls into a DST gap, the first local instant one hour
/// later is used; if that is also missing, UTC midnight is used.
pub fn local_midnight_millis(date: NaiveDate) -> i64 {
    local_midnight_millis_in(&chrono::Local, date)
}

pub(crate) fn local_midnight_millis_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(value) => value.timestamp_millis(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        LocalResult::None => tz
            .from_local_datetime(&(midnight + chrono::Duration::hours(1)))
            .earliest()
            .map(|value| value.timestamp_millis())
            .unwrap_or_else(|| midnight.and_utc().timestamp_millis()),
    }
}

#[cfg(test)]
mod tests {
    use super::{local_midnight_millis_in, parse_record_date, RecordValidationError};
    use chrono::{FixedOffset, NaiveDate, Utc};

    #[test]
    fn utc_midnight_matches_known_epoch() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(local_midnight_millis_in(&Utc, date), 1_704_067_200_000);
    }

    #[test]
    fn fixed_offset_shifts_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            local_midnight_millis_in(&plus_two, date),
            1_704_067_200_000 - 2 * 3_600_000
        );
    }

    #[test]
    fn parse_rejects_loose_shapes() {
        assert_eq!(parse_record_date(""), Err(RecordValidationError::EmptyDate));
        assert!(matches!(
            parse_record_date("2024-1-5"),
            Err(RecordValidationError::InvalidDateFormat(_))
        ));
        assert!(matches!(
            parse_record_date("2023-02-30"),
            Err(RecordValidationError::InvalidCalendarDate(_))
        ));
        assert_eq!(
            parse_record_date(" 2024-02-29 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
