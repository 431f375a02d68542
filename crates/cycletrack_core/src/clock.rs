//! Calendar clock abstraction.
//!
//! # Responsibility
//! - Answer "what is today" for validation and day-count queries.
//! - Let tests pin the current date without touching system time.
//!
//! # Invariants
//! - `today()` is a local calendar date with no time component.

use chrono::{Local, NaiveDate};

/// Source of the current local calendar date.
pub trait Clock {
    /// Returns today's date in the local timezone.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the host system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
