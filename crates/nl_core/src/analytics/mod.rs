use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::clock::{day_key, weekday_short};

pub const WEEKLY_WINDOW_DAYS: u32 = 7;

/// Completed analyses per calendar day, keyed `YYYY-MM-DD`.
///
/// Writes only ever increment. Keys are zero-padded so lexical order is calendar order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AnalyticsCounters {
    days: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyActivity {
    pub day: String,
    pub label: String,
    pub count: u64,
}

impl AnalyticsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the bucket for `date` and return the new count.
    pub fn increment(&mut self, date: Date) -> u64 {
        let slot = self.days.entry(day_key(date)).or_insert(0);
        *slot += 1;
        *slot
    }

    pub fn count_for(&self, date: Date) -> u64 {
        self.days.get(&day_key(date)).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.days.values().sum()
    }

    pub fn days(&self) -> impl Iterator<Item = (&str, u64)> {
        self.days.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// `n` consecutive days ending at `today`, oldest first. Days without a bucket report 0.
    pub fn trailing_days(&self, today: Date, n: u32) -> Vec<DailyActivity> {
        (0..n)
            .rev()
            .filter_map(|back| today.checked_sub(Duration::days(i64::from(back))))
            .map(|date| DailyActivity {
                day: day_key(date),
                label: weekday_short(date).to_string(),
                count: self.count_for(date),
            })
            .collect()
    }

    pub fn weekly_total(&self, today: Date) -> u64 {
        self.trailing_days(today, WEEKLY_WINDOW_DAYS)
            .iter()
            .map(|d| d.count)
            .sum()
    }

    /// Drop buckets strictly older than `retain_days` days before `today`. Returns how many
    /// buckets were removed.
    pub fn prune_older_than(&mut self, today: Date, retain_days: u32) -> usize {
        let Some(cutoff) = today.checked_sub(Duration::days(i64::from(retain_days))) else {
            return 0;
        };
        let cutoff = day_key(cutoff);
        let before = self.days.len();
        self.days.retain(|day, _| day.as_str() >= cutoff.as_str());
        before - self.days.len()
    }
}
