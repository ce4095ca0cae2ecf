//! ScheduledEvent — the unit the merge scheduler yields.

use super::ids::SeriesIndex;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A bar-close event in the merged global timeline.
///
/// The total order over events is `(timestamp, series)`: strictly smaller
/// timestamps first, and on equal timestamps the lower series index wins —
/// primary bars always execute before secondary bars with the same
/// timestamp. `Ord` encodes exactly that contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub series: SeriesIndex,
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.series.cmp(&other.series))
            .then(self.bar_index.cmp(&other.bar_index))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
