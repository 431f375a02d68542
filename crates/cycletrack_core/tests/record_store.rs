use chrono::NaiveDate;
use cycletrack_core::{
    CycleRecord, CycleTracker, FixedClock, KeyValueStore, KvRecordRepository,
    MemoryKeyValueStore, RecordRepository, SqliteKeyValueStore,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn sqlite_roundtrip_preserves_dates_and_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.db");
    let records = vec![
        CycleRecord::new(day(2024, 2, 26)),
        CycleRecord::new(day(2024, 1, 1)),
        CycleRecord {
            date: day(2023, 12, 4),
            timestamp: 1_701_648_000_000,
        },
    ];

    {
        let repo = KvRecordRepository::new(SqliteKeyValueStore::open(&path).unwrap());
        repo.save(&records).unwrap();
    }

    let repo = KvRecordRepository::new(SqliteKeyValueStore::open(&path).unwrap());
    assert_eq!(repo.load().unwrap(), records);
}

#[test]
fn persisted_value_uses_date_and_timestamp_fields() {
    let store = MemoryKeyValueStore::new();
    let repo = KvRecordRepository::new(&store);
    let record = CycleRecord::new(day(2024, 1, 29));
    repo.save(std::slice::from_ref(&record)).unwrap();

    let raw = store.get("periodTracker").unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["date"], "2024-01-29");
    assert_eq!(json[0]["timestamp"], record.timestamp);
    assert_eq!(json[0].as_object().unwrap().len(), 2);
}

#[test]
fn corrupt_store_starts_tracker_empty() {
    let store = MemoryKeyValueStore::with_entry("periodTracker", "definitely not json");
    let clock = FixedClock::new(day(2024, 3, 1));

    let mut tracker = CycleTracker::open(KvRecordRepository::new(&store), clock).unwrap();
    assert!(tracker.is_empty());

    tracker.add_event("2024-02-26").unwrap();
    let raw = store.raw("periodTracker").unwrap();
    assert!(raw.starts_with('['));
}

#[test]
fn duplicate_persisted_dates_are_collapsed_on_open() {
    let store = MemoryKeyValueStore::with_entry(
        "periodTracker",
        r#"[
            {"date":"2024-01-01","timestamp":1704067200000},
            {"date":"2024-01-29","timestamp":1706486400000},
            {"date":"2024-01-01","timestamp":1704067200000}
        ]"#,
    );
    let tracker = CycleTracker::open(
        KvRecordRepository::new(&store),
        FixedClock::new(day(2024, 2, 1)),
    )
    .unwrap();

    assert_eq!(tracker.len(), 2);
    assert_eq!(tracker.average_cycle_length(), Some(28));
}
