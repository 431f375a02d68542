//! Record repository contract and key-value implementation.
//!
//! # Responsibility
//! - Load and save the whole record list as one serialized entry.
//! - Report corrupt persisted data as a semantic error, not a transport one.
//!
//! # Invariants
//! - An absent entry loads as an empty list.
//! - `save` followed by `load` yields identical dates and timestamps.
//! - The persisted value is a JSON array of `{date, timestamp}` objects.

use crate::config::DEFAULT_STORAGE_KEY;
use crate::model::record::CycleRecord;
use crate::store::{KeyValueStore, StoreError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying store failed.
    Store(StoreError),
    /// Records could not be encoded.
    Serialize(serde_json::Error),
    /// Persisted value exists but is not a valid record list.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to encode records: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Persistence contract consumed by the tracker.
pub trait RecordRepository {
    /// Loads every persisted record in stored order.
    fn load(&self) -> RepoResult<Vec<CycleRecord>>;
    /// Replaces the persisted list with `records`.
    fn save(&self, records: &[CycleRecord]) -> RepoResult<()>;
}

/// Record repository storing JSON under a single key-value entry.
pub struct KvRecordRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KvRecordRepository<S> {
    /// Uses the default `periodTracker` key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<S: KeyValueStore> RecordRepository for KvRecordRepository<S> {
    fn load(&self) -> RepoResult<Vec<CycleRecord>> {
        let Some(raw) = self.store.get(&self.key)? else {
            debug!("event=records_load module=repo status=ok source=absent count=0");
            return Ok(Vec::new());
        };

        let records: Vec<CycleRecord> = serde_json::from_str(&raw).map_err(|err| {
            warn!(
                "event=records_load module=repo status=error error_code=invalid_json line={} column={}",
                err.line(),
                err.column()
            );
            RepoError::InvalidData(format!("entry `{}` is not a record list: {err}", self.key))
        })?;

        debug!(
            "event=records_load module=repo status=ok source=store count={}",
            records.len()
        );
        Ok(records)
    }

    fn save(&self, records: &[CycleRecord]) -> RepoResult<()> {
        let encoded = serde_json::to_string(records).map_err(RepoError::Serialize)?;
        self.store.set(&self.key, &encoded)?;
        debug!(
            "event=records_save module=repo status=ok count={}",
            records.len()
        );
        Ok(())
    }
}

impl<R: RecordRepository + ?Sized> RecordRepository for &R {
    fn load(&self) -> RepoResult<Vec<CycleRecord>> {
        (**self).load()
    }

    fn save(&self, records: &[CycleRecord]) -> RepoResult<()> {
        (**self).save(records)
    }
}

#[cfg(test)]
mod tests {
    use super::{KvRecordRepository, RecordRepository, RepoError};
    use crate::model::record::CycleRecord;
    use crate::store::MemoryKeyValueStore;
    use chrono::NaiveDate;

    #[test]
    fn absent_entry_loads_empty() {
        let repo = KvRecordRepository::new(MemoryKeyValueStore::new());
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn accepts_externally_written_wire_shape() {
        let store = MemoryKeyValueStore::with_entry(
            "periodTracker",
            r#"[{"date":"2024-02-26","timestamp":1708905600000}]"#,
        );
        let repo = KvRecordRepository::new(store);

        let records = repo.load().unwrap();
        assert_eq!(
            records,
            vec![CycleRecord {
                date: NaiveDate::from_ymd_opt(2024, 2, 26).unwrap(),
                timestamp: 1_708_905_600_000,
            }]
        );
    }

    #[test]
    fn corrupt_entry_is_invalid_data() {
        let repo = KvRecordRepository::new(MemoryKeyValueStore::with_entry(
            "periodTracker",
            "{not json",
        ));
        assert!(matches!(repo.load(), Err(RepoError::InvalidData(_))));
    }

    #[test]
    fn custom_key_isolates_entries() {
        let store = MemoryKeyValueStore::new();
        let repo = KvRecordRepository::with_key(&store, "other");
        let record = CycleRecord::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        repo.save(std::slice::from_ref(&record)).unwrap();

        assert!(store.raw("periodTracker").is_none());
        assert!(store.raw("other").unwrap().contains("\"2024-01-01\""));
    }
}
