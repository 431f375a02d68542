use chrono::{Days, NaiveDate};
use cycletrack_core::{
    CycleLabel, CycleTracker, DaysUntil, FixedClock, KvRecordRepository, MemoryKeyValueStore,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tracker_with(
    today: NaiveDate,
    dates: &[NaiveDate],
) -> CycleTracker<KvRecordRepository<MemoryKeyValueStore>, FixedClock> {
    let mut tracker = CycleTracker::open(
        KvRecordRepository::new(MemoryKeyValueStore::new()),
        FixedClock::new(today),
    )
    .unwrap();
    for date in dates {
        tracker
            .add_event(&date.format("%Y-%m-%d").to_string())
            .unwrap();
    }
    tracker
}

fn after(start: NaiveDate, gaps: &[u64]) -> Vec<NaiveDate> {
    let mut dates = vec![start];
    for gap in gaps {
        let last = *dates.last().unwrap();
        dates.push(last + Days::new(*gap));
    }
    dates
}

#[test]
fn regular_28_day_cycles_average_to_28() {
    let tracker = tracker_with(
        day(2024, 3, 1),
        &[day(2024, 1, 1), day(2024, 1, 29), day(2024, 2, 26)],
    );
    assert_eq!(tracker.average_cycle_length(), Some(28));
}

#[test]
fn insertion_order_does_not_matter() {
    let tracker = tracker_with(
        day(2024, 3, 1),
        &[day(2024, 2, 26), day(2024, 1, 1), day(2024, 1, 29)],
    );
    assert_eq!(tracker.average_cycle_length(), Some(28));
    assert_eq!(tracker.predict_next_event(), Some(day(2024, 3, 25)));
    assert_eq!(tracker.records_ascending()[0].date, day(2024, 1, 1));
    assert_eq!(tracker.records_descending()[0].date, day(2024, 2, 26));
}

#[test]
fn implausible_short_gap_is_filtered() {
    let dates = after(day(2024, 1, 1), &[5, 28]);
    let tracker = tracker_with(day(2024, 3, 1), &dates);
    assert_eq!(tracker.average_cycle_length(), Some(28));
}

#[test]
fn all_gaps_implausible_is_unavailable() {
    let dates = after(day(2023, 1, 1), &[5, 90]);
    let tracker = tracker_with(day(2024, 3, 1), &dates);
    assert_eq!(tracker.average_cycle_length(), None);
    assert_eq!(tracker.predict_next_event(), None);
    assert_eq!(tracker.days_until_next(), None);
}

#[test]
fn boundary_gaps_of_15_and_50_are_excluded() {
    let fifteen = tracker_with(day(2024, 6, 1), &after(day(2024, 1, 1), &[15]));
    assert_eq!(fifteen.average_cycle_length(), None);

    let fifty = tracker_with(day(2024, 6, 1), &after(day(2024, 1, 1), &[50]));
    assert_eq!(fifty.average_cycle_length(), None);

    let mixed = tracker_with(day(2024, 6, 1), &after(day(2024, 1, 1), &[15, 16, 49, 50]));
    assert_eq!(mixed.average_cycle_length(), Some(33));
}

#[test]
fn fewer_than_two_records_is_unavailable() {
    let empty = tracker_with(day(2024, 3, 1), &[]);
    assert_eq!(empty.average_cycle_length(), None);
    assert_eq!(empty.current_cycle_day(), None);
    assert_eq!(empty.predict_next_event(), None);

    let single = tracker_with(day(2024, 3, 1), &[day(2024, 2, 1)]);
    assert_eq!(single.average_cycle_length(), None);
    assert_eq!(single.predict_next_event(), None);
}

#[test]
fn current_cycle_day_counts_event_day_as_one() {
    let today = day(2024, 3, 1);
    let same_day = tracker_with(today, &[today]);
    assert_eq!(same_day.current_cycle_day(), Some(1));

    let later = tracker_with(today, &[day(2024, 1, 1), day(2024, 2, 26)]);
    assert_eq!(later.current_cycle_day(), Some(5));
}

#[test]
fn prediction_adds_average_to_latest_date() {
    let tracker = tracker_with(
        day(2024, 3, 20),
        &[day(2024, 1, 1), day(2024, 1, 29), day(2024, 2, 26)],
    );
    assert_eq!(tracker.predict_next_event(), Some(day(2024, 3, 25)));
    assert_eq!(tracker.days_until_next(), Some(DaysUntil::InDays(5)));
}

#[test]
fn countdown_reports_today_and_overdue() {
    let dates = [day(2024, 1, 1), day(2024, 1, 29), day(2024, 2, 26)];

    let due = tracker_with(day(2024, 3, 25), &dates);
    assert_eq!(due.days_until_next(), Some(DaysUntil::Today));

    let overdue = tracker_with(day(2024, 3, 28), &dates);
    assert_eq!(overdue.days_until_next(), Some(DaysUntil::Overdue(3)));
    assert_eq!(
        overdue.days_until_next().unwrap().to_string(),
        "3 days overdue"
    );
}

#[test]
fn summary_matches_individual_queries() {
    let tracker = tracker_with(
        day(2024, 3, 1),
        &[day(2024, 1, 1), day(2024, 2, 5), day(2024, 2, 26)],
    );
    let summary = tracker.summary();

    assert_eq!(summary.current_cycle_day, tracker.current_cycle_day());
    assert_eq!(summary.average_cycle_length, Some(28));
    assert_eq!(summary.next_event, tracker.predict_next_event());
    assert_eq!(summary.days_until_next, tracker.days_until_next());

    let labels: Vec<CycleLabel> = summary.history.iter().map(|entry| entry.label).collect();
    assert_eq!(
        labels,
        vec![
            CycleLabel::Cycle(21),
            CycleLabel::Cycle(35),
            CycleLabel::FirstEntry
        ]
    );
    assert_eq!(summary.history, tracker.history());
}
