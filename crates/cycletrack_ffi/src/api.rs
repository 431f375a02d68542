//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose tracker use-cases to Dart via FRB as an explicit handle.
//! - Render derived values into display-ready strings.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The host owns every `TrackerHandle`; no tracker state is global.
//! - Unavailable values render as `-`.

use cycletrack_core::{
    core_version as core_version_inner, format_long_date, init_logging as init_logging_inner,
    ping as ping_inner, CycleSummary, CycleTracker, DeleteToken, KvRecordRepository,
    SqliteKeyValueStore, SystemClock, TrackerConfig,
};
use log::error;
use std::sync::Mutex;

const UNAVAILABLE: &str = "-";
const EMPTY_HISTORY_MESSAGE: &str = "No periods recorded yet. Add your first period date above!";

type SqliteTracker = CycleTracker<KvRecordRepository<SqliteKeyValueStore>, SystemClock>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Result envelope for add/delete actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerActionResponse {
    /// Whether the action changed or intentionally left state.
    pub ok: bool,
    /// User-facing message; shown as a blocking notification when `ok` is false.
    pub message: String,
}

impl TrackerActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Result of the first deletion step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequestResponse {
    pub ok: bool,
    /// Token to pass to `confirm_delete` or `cancel_delete`.
    pub token: Option<String>,
    /// Confirmation prompt or error message.
    pub message: String,
}

/// One history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItemView {
    /// ISO date, used as the delete action argument.
    pub date: String,
    /// Long display form, e.g. `February 26, 2024`.
    pub display_date: String,
    /// `Cycle: N days` or `First entry`.
    pub cycle_info: String,
}

/// Display-ready snapshot of all derived fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub current_cycle_day: String,
    pub average_cycle_length: String,
    pub next_event: String,
    pub days_until_next: String,
    pub history: Vec<HistoryItemView>,
    /// Placeholder text when history is empty.
    pub empty_message: Option<String>,
}

impl From<CycleSummary> for SummaryView {
    fn from(summary: CycleSummary) -> Self {
        let history = summary
            .history
            .into_iter()
            .map(|entry| HistoryItemView {
                date: entry.record.date_key(),
                display_date: format_long_date(entry.record.date),
                cycle_info: entry.label.to_string(),
            })
            .collect::<Vec<_>>();
        let empty_message = history
            .is_empty()
            .then(|| EMPTY_HISTORY_MESSAGE.to_string());

        Self {
            current_cycle_day: render(summary.current_cycle_day),
            average_cycle_length: render(summary.average_cycle_length),
            next_event: summary
                .next_event
                .map(format_long_date)
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            days_until_next: render(summary.days_until_next),
            history,
            empty_message,
        }
    }
}

fn render(value: Option<impl ToString>) -> String {
    value.map_or_else(|| UNAVAILABLE.to_string(), |v| v.to_string())
}

/// Host-owned tracker backed by a SQLite key-value store.
#[flutter_rust_bridge::frb(opaque)]
pub struct TrackerHandle {
    inner: Mutex<SqliteTracker>,
}

impl TrackerHandle {
    /// Opens the tracker stored at absolute `db_path`.
    ///
    /// # FFI contract
    /// - Sync call; opens and migrates the database file.
    /// - Corrupt stored records start the tracker empty instead of failing.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open(db_path: String) -> Result<TrackerHandle, String> {
        Self::open_config(TrackerConfig::with_db_path(&db_path)?)
    }

    /// Opens the tracker stored under `storage_key` in absolute `db_path`.
    ///
    /// Trackers with different keys share the file but not their records.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open_with_key(db_path: String, storage_key: String) -> Result<TrackerHandle, String> {
        Self::open_config(TrackerConfig::with_db_path(&db_path)?.with_storage_key(&storage_key)?)
    }

    fn open_config(config: TrackerConfig) -> Result<TrackerHandle, String> {
        let store = SqliteKeyValueStore::open(&config.db_path)
            .map_err(|err| format!("tracker store open failed: {err}"))?;
        Self::from_store(store, config.storage_key)
    }

    /// Opens a tracker whose data lives only as long as the handle.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open_in_memory() -> Result<TrackerHandle, String> {
        let store = SqliteKeyValueStore::open_in_memory()
            .map_err(|err| format!("tracker store open failed: {err}"))?;
        Self::from_store(store, TrackerConfig::default().storage_key)
    }

    fn from_store(store: SqliteKeyValueStore, key: String) -> Result<TrackerHandle, String> {
        let repo = KvRecordRepository::with_key(store, key);
        let tracker = CycleTracker::open(repo, SystemClock)
            .map_err(|err| format!("tracker open failed: {err}"))?;
        Ok(Self {
            inner: Mutex::new(tracker),
        })
    }

    /// Records a date from the input control.
    #[flutter_rust_bridge::frb(sync)]
    pub fn add_event(&self, date: String) -> TrackerActionResponse {
        match self.with_tracker(|tracker| {
            tracker
                .add_event(&date)
                .map_err(|err| err.to_string())
        }) {
            Ok(_) => TrackerActionResponse::success("Period date recorded."),
            Err(message) => TrackerActionResponse::failure(message),
        }
    }

    /// First deletion step; returns the token and a confirmation prompt.
    ///
    /// A date with no record yields no token, so the host skips the prompt.
    #[flutter_rust_bridge::frb(sync)]
    pub fn request_delete(&self, date: String) -> DeleteRequestResponse {
        match self.with_tracker(|tracker| {
            tracker
                .request_delete(&date)
                .map_err(|err| err.to_string())
        }) {
            Ok(Some(request)) => DeleteRequestResponse {
                ok: true,
                token: Some(request.token.to_string()),
                message: "Are you sure you want to delete this period entry?".to_string(),
            },
            Ok(None) => DeleteRequestResponse {
                ok: true,
                token: None,
                message: "Nothing to delete.".to_string(),
            },
            Err(message) => DeleteRequestResponse {
                ok: false,
                token: None,
                message,
            },
        }
    }

    /// Confirms a pending deletion.
    #[flutter_rust_bridge::frb(sync)]
    pub fn confirm_delete(&self, token: String) -> TrackerActionResponse {
        let Some(token) = DeleteToken::parse(&token) else {
            return TrackerActionResponse::failure("Invalid delete request.");
        };
        match self.with_tracker(|tracker| {
            tracker
                .confirm_delete(token)
                .map_err(|err| err.to_string())
        }) {
            Ok(true) => TrackerActionResponse::success("Period entry deleted."),
            Ok(false) => TrackerActionResponse::success("Nothing to delete."),
            Err(message) => TrackerActionResponse::failure(message),
        }
    }

    /// Declines a pending deletion.
    #[flutter_rust_bridge::frb(sync)]
    pub fn cancel_delete(&self, token: String) -> TrackerActionResponse {
        let Some(token) = DeleteToken::parse(&token) else {
            return TrackerActionResponse::failure("Invalid delete request.");
        };
        match self.with_tracker(|tracker| Ok(tracker.cancel_delete(token))) {
            Ok(true) => TrackerActionResponse::success("Deletion cancelled."),
            Ok(false) => TrackerActionResponse::failure("Invalid delete request."),
            Err(message) => TrackerActionResponse::failure(message),
        }
    }

    /// Current display snapshot.
    #[flutter_rust_bridge::frb(sync)]
    pub fn summary(&self) -> SummaryView {
        match self.with_tracker(|tracker| Ok(tracker.summary())) {
            Ok(summary) => summary.into(),
            Err(message) => {
                error!("event=summary module=ffi status=error error={message}");
                CycleSummary {
                    current_cycle_day: None,
                    average_cycle_length: None,
                    next_event: None,
                    days_until_next: None,
                    history: Vec::new(),
                }
                .into()
            }
        }
    }

    /// Upper bound for the date input control, as `YYYY-MM-DD`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn max_selectable_date(&self) -> String {
        self.with_tracker(|tracker| Ok(tracker.today().format("%Y-%m-%d").to_string()))
            .unwrap_or_default()
    }

    fn with_tracker<T>(
        &self,
        f: impl FnOnce(&mut SqliteTracker) -> Result<T, String>,
    ) -> Result<T, String> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| "tracker state is unavailable after a previous failure".to_string())?;
        f(&mut guard)
    }
}
