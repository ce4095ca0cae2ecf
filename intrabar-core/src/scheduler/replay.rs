//! Historical replay: k-way merge over materialized series.

use crate::domain::{ScheduledEvent, SeriesIndex};
use crate::registry::SeriesRegistry;
use chrono::NaiveDateTime;

/// Iterator over the merged bar-close timeline of a registry.
///
/// One cursor per series; each step emits the cursor head with the lowest
/// `(timestamp, series index)` pair and advances that cursor. Exhausted when
/// every cursor is. Because series are append-only with strictly increasing
/// timestamps, the emitted stream never regresses.
pub struct ReplayScheduler<'a> {
    registry: &'a SeriesRegistry,
    cursors: Vec<usize>,
    last_emitted: Option<NaiveDateTime>,
}

impl<'a> ReplayScheduler<'a> {
    pub fn new(registry: &'a SeriesRegistry) -> Self {
        Self {
            registry,
            cursors: vec![0; registry.series_count()],
            last_emitted: None,
        }
    }

    fn head(&self, series: usize) -> Option<ScheduledEvent> {
        let bar_index = self.cursors[series];
        let bar = self.registry.bar(SeriesIndex(series), bar_index)?;
        Some(ScheduledEvent {
            series: SeriesIndex(series),
            bar_index,
            timestamp: bar.timestamp,
        })
    }
}

impl Iterator for ReplayScheduler<'_> {
    type Item = ScheduledEvent;

    fn next(&mut self) -> Option<ScheduledEvent> {
        let next = (0..self.cursors.len())
            .filter_map(|series| self.head(series))
            .min()?;

        debug_assert!(
            self.last_emitted.map_or(true, |last| last <= next.timestamp),
            "scheduler regressed from {:?} to {:?}",
            self.last_emitted,
            next.timestamp
        );

        self.cursors[next.series.0] += 1;
        self.last_emitted = Some(next.timestamp);
        Some(next)
    }
}
