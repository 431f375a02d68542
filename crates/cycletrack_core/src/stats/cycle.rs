//! Cycle arithmetic over record slices.
//!
//! # Responsibility
//! - Derive cycle gaps, averages, current day and next-date predictions.
//!
//! # Invariants
//! - Functions are pure: they sort copies and never reorder the caller's data.
//! - Ascending order is by `(timestamp, date)`; descending is its reverse.
//! - Only gaps with `15 < gap < 50` days count towards the average.

use crate::model::record::CycleRecord;
use chrono::{Days, NaiveDate};
use std::cmp::Ordering;

/// Gaps at or below this many days are treated as duplicate entries.
pub const MIN_PLAUSIBLE_CYCLE_DAYS: i64 = 15;
/// Gaps at or above this many days are treated as missed logging.
pub const MAX_PLAUSIBLE_CYCLE_DAYS: i64 = 50;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn chronological(a: &CycleRecord, b: &CycleRecord) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.date.cmp(&b.date))
}

/// Returns a copy sorted oldest first.
pub fn sorted_ascending(records: &[CycleRecord]) -> Vec<CycleRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(chronological);
    sorted
}

/// Returns a copy sorted most recent first.
pub fn sorted_descending(records: &[CycleRecord]) -> Vec<CycleRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| chronological(b, a));
    sorted
}

/// Returns the most recent record, if any.
pub fn most_recent(records: &[CycleRecord]) -> Option<&CycleRecord> {
    records.iter().max_by(|a, b| chronological(a, b))
}

/// Whole days from `older` to `newer`, rounded to nearest.
///
/// Rounding absorbs the one-hour drift of DST transitions between two local
/// midnights.
pub fn gap_days(older: &CycleRecord, newer: &CycleRecord) -> i64 {
    ((newer.timestamp - older.timestamp) as f64 / MILLIS_PER_DAY).round() as i64
}

pub fn is_plausible_cycle(days: i64) -> bool {
    days > MIN_PLAUSIBLE_CYCLE_DAYS && days < MAX_PLAUSIBLE_CYCLE_DAYS
}

/// Gaps between consecutive records in chronological order, unfiltered.
pub fn cycle_gaps(records: &[CycleRecord]) -> Vec<i64> {
    sorted_ascending(records)
        .windows(2)
        .map(|pair| gap_days(&pair[0], &pair[1]))
        .collect()
}

/// Rounded mean of plausible gaps.
///
/// Returns `None` with fewer than two records or when no gap is plausible.
pub fn average_cycle_length(records: &[CycleRecord]) -> Option<u32> {
    if records.len() < 2 {
        return None;
    }

    let plausible: Vec<i64> = cycle_gaps(records)
        .into_iter()
        .filter(|days| is_plausible_cycle(*days))
        .collect();
    if plausible.is_empty() {
        return None;
    }

    let sum: i64 = plausible.iter().sum();
    let mean = sum as f64 / plausible.len() as f64;
    u32::try_from(mean.round() as i64).ok()
}

/// Day number within the current cycle, where the event day itself is day 1.
///
/// Returns `None` without records or when the latest record lies after
/// `today`.
pub fn current_cycle_day(records: &[CycleRecord], today: NaiveDate) -> Option<u32> {
    let latest = most_recent(records)?;
    let day = (today - latest.date).num_days() + 1;
    if day > 0 {
        u32::try_from(day).ok()
    } else {
        None
    }
}

/// Latest recorded date shifted by the average cycle length.
pub fn predict_next(records: &[CycleRecord]) -> Option<NaiveDate> {
    let latest = most_recent(records)?;
    let average = average_cycle_length(records)?;
    latest.date.checked_add_days(Days::new(u64::from(average)))
}
