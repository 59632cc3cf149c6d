use pretty_assertions::assert_eq;
use time::macros::date;

use nl_core::analytics::{AnalyticsCounters, DailyActivity, WEEKLY_WINDOW_DAYS};

fn activity(day: &str, label: &str, count: u64) -> DailyActivity {
    DailyActivity {
        day: day.to_string(),
        label: label.to_string(),
        count,
    }
}

#[test]
fn trailing_week_fills_gaps_and_labels_weekdays() {
    let mut counters: AnalyticsCounters =
        serde_json::from_str(r#"{"2026-02-20":9,"2026-02-24":2,"2026-03-01":1}"#).expect("decode");
    counters.increment(date!(2026 - 03 - 02));
    counters.increment(date!(2026 - 03 - 02));

    let week = counters.trailing_days(date!(2026 - 03 - 02), WEEKLY_WINDOW_DAYS);
    assert_eq!(
        week,
        vec![
            activity("2026-02-24", "Tue", 2),
            activity("2026-02-25", "Wed", 0),
            activity("2026-02-26", "Thu", 0),
            activity("2026-02-27", "Fri", 0),
            activity("2026-02-28", "Sat", 0),
            activity("2026-03-01", "Sun", 1),
            activity("2026-03-02", "Mon", 2),
        ]
    );
    // Buckets outside the window are kept but not counted.
    assert_eq!(counters.weekly_total(date!(2026 - 03 - 02)), 5);
    assert_eq!(counters.total(), 14);
}

#[test]
fn empty_counters_report_zero_week() {
    let counters = AnalyticsCounters::new();
    let week = counters.trailing_days(date!(2026 - 01 - 03), WEEKLY_WINDOW_DAYS);
    assert_eq!(week.len(), 7);
    assert_eq!(week[0].day, "2025-12-28");
    assert!(week.iter().all(|d| d.count == 0));
    assert_eq!(counters.weekly_total(date!(2026 - 01 - 03)), 0);
}
