use std::collections::VecDeque;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{AnalysisResult, Verdict};

pub const HISTORY_CAPACITY: usize = 10;

/// Most-recent-first log of completed analyses with a fixed capacity.
///
/// Serialized as a plain JSON array. Deserializing an array longer than the capacity keeps the
/// leading (most recent) entries. Entries are decoded one at a time; an entry that does not
/// decode is logged and skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLog {
    entries: VecDeque<AnalysisResult>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerdictBreakdown {
    pub likely_real: u32,
    pub possibly_false: u32,
    pub likely_fake: u32,
}

impl VerdictBreakdown {
    pub fn total(&self) -> u32 {
        self.likely_real + self.possibly_false + self.likely_fake
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Insert at the front, returning the evicted oldest entry if the log was full.
    pub fn push_front(&mut self, result: AnalysisResult) -> Option<AnalysisResult> {
        self.entries.push_front(result);
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn get(&self, id: &str) -> Option<&AnalysisResult> {
        self.entries.iter().find(|r| r.id == id)
    }

    pub fn latest(&self) -> Option<&AnalysisResult> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn verdict_breakdown(&self) -> VerdictBreakdown {
        let mut out = VerdictBreakdown::default();
        for r in &self.entries {
            match r.verdict {
                Verdict::LikelyReal => out.likely_real += 1,
                Verdict::PossiblyFalse => out.possibly_false += 1,
                Verdict::LikelyFake => out.likely_fake += 1,
            }
        }
        out
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<AnalysisResult> for HistoryLog {
    fn from_iter<I: IntoIterator<Item = AnalysisResult>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().take(HISTORY_CAPACITY).collect(),
        }
    }
}

impl Serialize for HistoryLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

impl<'de> Deserialize<'de> for HistoryLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<AnalysisResult>(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(index, err = %e, "skipping unreadable history entry");
                    None
                }
            });
        Ok(entries.collect())
    }
}
