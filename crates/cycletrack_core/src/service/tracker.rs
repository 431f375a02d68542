//! Cycle tracker use-case service.
//!
//! # Responsibility
//! - Own the in-memory record collection and keep it in sync with storage.
//! - Validate additions and gate deletions behind explicit confirmation.
//! - Answer derived statistics queries against the current clock.
//!
//! # Invariants
//! - No two records share a date.
//! - Every successful mutation is persisted before it returns; a failed
//!   persist leaves the in-memory collection as it was.
//! - Queries sort copies; internal order is never relied on.
//! - Record dates are never logged.

use crate::clock::Clock;
use crate::model::record::{parse_record_date, CycleRecord, RecordValidationError};
use crate::repo::record_repo::{RecordRepository, RepoError};
use crate::stats::cycle;
use crate::stats::summary::{self, CycleSummary, DaysUntil, HistoryEntry};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Error returned by tracker mutations.
#[derive(Debug)]
pub enum TrackerError {
    /// No date was provided.
    EmptyDate,
    /// Input is not a valid `YYYY-MM-DD` date.
    InvalidDate(RecordValidationError),
    /// Date lies after the clock's today.
    FutureDate { date: NaiveDate, today: NaiveDate },
    /// Date is already recorded.
    DuplicateDate(NaiveDate),
    /// Token was never issued, was already confirmed or cancelled, or was
    /// invalidated by a later change to its date.
    UnknownDeleteToken(DeleteToken),
    /// Persistence failed; in-memory state was left unchanged.
    Repo(RepoError),
}

impl TrackerError {
    /// Returns whether this error rejects user input rather than reporting
    /// a storage failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyDate
                | Self::InvalidDate(_)
                | Self::FutureDate { .. }
                | Self::DuplicateDate(_)
        )
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyDate => "empty_date",
            Self::InvalidDate(_) => "invalid_date",
            Self::FutureDate { .. } => "future_date",
            Self::DuplicateDate(_) => "duplicate_date",
            Self::UnknownDeleteToken(_) => "unknown_delete_token",
            Self::Repo(_) => "repo_error",
        }
    }
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDate => write!(f, "Please select a date"),
            Self::InvalidDate(err) => write!(f, "{err}"),
            Self::FutureDate { .. } => write!(f, "Period date cannot be in the future"),
            Self::DuplicateDate(_) => write!(f, "This date is already recorded"),
            Self::UnknownDeleteToken(token) => write!(f, "unknown delete request: {token}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDate(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TrackerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RecordValidationError> for TrackerError {
    fn from(value: RecordValidationError) -> Self {
        match value {
            RecordValidationError::EmptyDate => Self::EmptyDate,
            other => Self::InvalidDate(other),
        }
    }
}

/// Opaque handle for a pending deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeleteToken(Uuid);

impl DeleteToken {
    fn issue() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a token previously rendered with `to_string()`.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl Display for DeleteToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First step of a two-step deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub token: DeleteToken,
    pub date: NaiveDate,
}

/// Tracker over a record repository and a calendar clock.
pub struct CycleTracker<R: RecordRepository, C: Clock> {
    repo: R,
    clock: C,
    records: Vec<CycleRecord>,
    pending_deletes: HashMap<DeleteToken, NaiveDate>,
}

impl<R: RecordRepository, C: Clock> CycleTracker<R, C> {
    /// Loads persisted records and builds a tracker.
    ///
    /// Corrupt persisted data is treated as "no prior data" and logged.
    /// Records repeating an earlier date are dropped.
    ///
    /// # Errors
    /// - Returns `Repo` when the store itself cannot be read.
    pub fn open(repo: R, clock: C) -> TrackerResult<Self> {
        let loaded = match repo.load() {
            Ok(records) => records,
            Err(RepoError::InvalidData(_)) => {
                warn!("event=tracker_open module=tracker status=recovered reason=corrupt_store count=0");
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "event=tracker_open module=tracker status=error error_code=repo_error error={err}"
                );
                return Err(err.into());
            }
        };

        let records = dedupe_by_date(loaded);
        info!(
            "event=tracker_open module=tracker status=ok count={}",
            records.len()
        );
        Ok(Self {
            repo,
            clock,
            records,
            pending_deletes: HashMap::new(),
        })
    }

    /// Records a new event date.
    ///
    /// # Errors
    /// - `EmptyDate` / `InvalidDate` for missing or malformed input.
    /// - `FutureDate` when the date is after today.
    /// - `DuplicateDate` when the date is already recorded.
    /// - `Repo` when persisting fails; the record is not kept.
    pub fn add_event(&mut self, input: &str) -> TrackerResult<CycleRecord> {
        let result = self.try_add(input);
        match &result {
            Ok(_) => info!(
                "event=record_add module=tracker status=ok count={}",
                self.records.len()
            ),
            Err(err) if err.is_validation() => info!(
                "event=record_add module=tracker status=rejected error_code={}",
                err.code()
            ),
            Err(err) => warn!(
                "event=record_add module=tracker status=error error_code={} error={err}",
                err.code()
            ),
        }
        result
    }

    fn try_add(&mut self, input: &str) -> TrackerResult<CycleRecord> {
        let date = parse_record_date(input)?;
        let today = self.clock.today();
        if date > today {
            return Err(TrackerError::FutureDate { date, today });
        }
        if self.contains(date) {
            return Err(TrackerError::DuplicateDate(date));
        }

        let record = CycleRecord::new(date);
        self.records.push(record.clone());
        if let Err(err) = self.repo.save(&self.records) {
            self.records.pop();
            return Err(err.into());
        }
        self.forget_pending(date);
        Ok(record)
    }

    /// Starts a deletion; nothing is removed until `confirm_delete`.
    ///
    /// Returns `Ok(None)` when no record has the date, so there is nothing
    /// to confirm. A new request for a date replaces any earlier token for it.
    ///
    /// # Errors
    /// - `EmptyDate` / `InvalidDate` for missing or malformed input.
    pub fn request_delete(&mut self, input: &str) -> TrackerResult<Option<DeleteRequest>> {
        let date = parse_record_date(input)?;
        if !self.contains(date) {
            info!("event=record_delete module=tracker status=noop reason=not_found");
            return Ok(None);
        }

        self.forget_pending(date);
        let token = DeleteToken::issue();
        self.pending_deletes.insert(token, date);
        Ok(Some(DeleteRequest { token, date }))
    }

    /// Completes a deletion started by `request_delete`.
    ///
    /// Returns `Ok(false)` when no record has the requested date.
    ///
    /// # Errors
    /// - `UnknownDeleteToken` when the token is not pending, including
    ///   tokens invalidated because their date was deleted or re-added.
    /// - `Repo` when persisting fails; the record is kept.
    pub fn confirm_delete(&mut self, token: DeleteToken) -> TrackerResult<bool> {
        let date = self
            .pending_deletes
            .remove(&token)
            .ok_or(TrackerError::UnknownDeleteToken(token))?;
        self.remove_date(date)
    }

    /// Declines a pending deletion. Returns whether the token was pending.
    pub fn cancel_delete(&mut self, token: DeleteToken) -> bool {
        let cancelled = self.pending_deletes.remove(&token).is_some();
        if cancelled {
            info!("event=record_delete module=tracker status=declined");
        }
        cancelled
    }

    /// Deletes `input` if `confirm` approves it.
    ///
    /// Returns `Ok(false)` when declined or when no record matches.
    pub fn delete_event_with(
        &mut self,
        input: &str,
        confirm: impl FnOnce(NaiveDate) -> bool,
    ) -> TrackerResult<bool> {
        let date = parse_record_date(input)?;
        if !confirm(date) {
            info!("event=record_delete module=tracker status=declined");
            return Ok(false);
        }
        self.remove_date(date)
    }

    /// Drops every pending token that targets `date`.
    fn forget_pending(&mut self, date: NaiveDate) {
        self.pending_deletes.retain(|_, pending| *pending != date);
    }

    /// Number of deletions awaiting confirmation.
    pub fn pending_delete_count(&self) -> usize {
        self.pending_deletes.len()
    }

    fn remove_date(&mut self, date: NaiveDate) -> TrackerResult<bool> {
        let Some(index) = self.records.iter().position(|record| record.date == date) else {
            info!("event=record_delete module=tracker status=noop reason=not_found");
            return Ok(false);
        };

        let removed = self.records.remove(index);
        if let Err(err) = self.repo.save(&self.records) {
            self.records.insert(index, removed);
            warn!("event=record_delete module=tracker status=error error_code=repo_error error={err}");
            return Err(err.into());
        }
        self.forget_pending(date);

        info!(
            "event=record_delete module=tracker status=ok count={}",
            self.records.len()
        );
        Ok(true)
    }

    /// Rounded mean of plausible cycle lengths in days.
    pub fn average_cycle_length(&self) -> Option<u32> {
        cycle::average_cycle_length(&self.records)
    }

    /// Day number since the latest recorded event, starting at 1.
    pub fn current_cycle_day(&self) -> Option<u32> {
        cycle::current_cycle_day(&self.records, self.clock.today())
    }

    /// Latest recorded date plus the average cycle length.
    pub fn predict_next_event(&self) -> Option<NaiveDate> {
        cycle::predict_next(&self.records)
    }

    /// Countdown to the predicted next event.
    pub fn days_until_next(&self) -> Option<DaysUntil> {
        self.predict_next_event()
            .map(|predicted| DaysUntil::between(self.clock.today(), predicted))
    }

    /// History rows, most recent first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        summary::history(&self.records)
    }

    /// Every derived value at once.
    pub fn summary(&self) -> CycleSummary {
        CycleSummary::compute(&self.records, self.clock.today())
    }

    pub fn records_ascending(&self) -> Vec<CycleRecord> {
        cycle::sorted_ascending(&self.records)
    }

    pub fn records_descending(&self) -> Vec<CycleRecord> {
        cycle::sorted_descending(&self.records)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.records.iter().any(|record| record.date == date)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest date the input control should allow.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

fn dedupe_by_date(records: Vec<CycleRecord>) -> Vec<CycleRecord> {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<CycleRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.date))
        .collect();
    if unique.len() != total {
        warn!(
            "event=tracker_open module=tracker status=recovered reason=duplicate_dates dropped={}",
            total - unique.len()
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::{dedupe_by_date, TrackerError};
    use crate::model::record::{CycleRecord, RecordValidationError};
    use chrono::NaiveDate;

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let first = CycleRecord {
            date,
            timestamp: 1,
        };
        let second = CycleRecord {
            date,
            timestamp: 2,
        };
        let deduped = dedupe_by_date(vec![first.clone(), second]);
        assert_eq!(deduped, vec![first]);
    }

    #[test]
    fn validation_errors_are_classified() {
        assert!(TrackerError::EmptyDate.is_validation());
        assert!(TrackerError::from(RecordValidationError::EmptyDate).is_validation());
        assert!(matches!(
            TrackerError::from(RecordValidationError::InvalidDateFormat("x".into())),
            TrackerError::InvalidDate(_)
        ));
    }
}
