//! Core domain logic for CycleTrack.
//! This crate is the single source of truth for record invariants and
//! cycle statistics.

pub mod clock;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::TrackerConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{
    local_midnight_millis, parse_record_date, CycleRecord, RecordValidationError,
};
pub use repo::record_repo::{KvRecordRepository, RecordRepository, RepoError, RepoResult};
pub use service::tracker::{
    CycleTracker, DeleteRequest, DeleteToken, TrackerError, TrackerResult,
};
pub use stats::summary::{format_long_date, CycleLabel, CycleSummary, DaysUntil, HistoryEntry};
pub use store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreError, StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
