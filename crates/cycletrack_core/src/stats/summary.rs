//! Display-oriented derivations consumed by the presentation layer.
//!
//! # Responsibility
//! - Turn cycle statistics into values a UI can render directly.
//! - Own the user-facing wording of countdowns and history labels.
//!
//! # Invariants
//! - History is most recent first; only the oldest entry is `FirstEntry`.
//! - Countdown wording is `N days overdue`, `Today` or `N days`.

use super::cycle::{
    average_cycle_length, current_cycle_day, gap_days, predict_next, sorted_descending,
};
use crate::model::record::CycleRecord;
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};

/// Distance from today to the predicted next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysUntil {
    /// Prediction is this many days in the past.
    Overdue(u32),
    /// Prediction is today.
    Today,
    /// Prediction is this many days ahead.
    InDays(u32),
}

impl DaysUntil {
    /// Classifies `predicted - today` in whole days.
    pub fn between(today: NaiveDate, predicted: NaiveDate) -> Self {
        let days = (predicted - today).num_days();
        let magnitude = u32::try_from(days.unsigned_abs()).unwrap_or(u32::MAX);
        match days {
            d if d < 0 => Self::Overdue(magnitude),
            0 => Self::Today,
            _ => Self::InDays(magnitude),
        }
    }
}

impl Display for DaysUntil {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overdue(days) => write!(f, "{days} days overdue"),
            Self::Today => write!(f, "Today"),
            Self::InDays(days) => write!(f, "{days} days"),
        }
    }
}

/// Cycle information shown next to one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleLabel {
    /// Days since the next older record.
    Cycle(i64),
    /// Oldest record; no cycle length exists.
    FirstEntry,
}

impl Display for CycleLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cycle(days) => write!(f, "Cycle: {days} days"),
            Self::FirstEntry => write!(f, "First entry"),
        }
    }
}

/// One row of the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub record: CycleRecord,
    pub label: CycleLabel,
}

/// Snapshot of every derived value a full display refresh needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub current_cycle_day: Option<u32>,
    pub average_cycle_length: Option<u32>,
    pub next_event: Option<NaiveDate>,
    pub days_until_next: Option<DaysUntil>,
    pub history: Vec<HistoryEntry>,
}

impl CycleSummary {
    pub fn compute(records: &[CycleRecord], today: NaiveDate) -> Self {
        let next_event = predict_next(records);
        Self {
            current_cycle_day: current_cycle_day(records, today),
            average_cycle_length: average_cycle_length(records),
            next_event,
            days_until_next: next_event.map(|predicted| DaysUntil::between(today, predicted)),
            history: history(records),
        }
    }
}

/// Builds history rows, most recent first.
pub fn history(records: &[CycleRecord]) -> Vec<HistoryEntry> {
    let sorted = sorted_descending(records);
    sorted
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let label = match sorted.get(index + 1) {
                Some(older) => CycleLabel::Cycle(gap_days(older, record)),
                None => CycleLabel::FirstEntry,
            };
            HistoryEntry {
                record: record.clone(),
                label,
            }
        })
        .collect()
}

/// Formats a date as `February 26, 2024`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
