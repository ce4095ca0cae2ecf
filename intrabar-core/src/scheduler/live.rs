//! Live ingestion: the same ordering contract over a stream.
//!
//! Producers push closed bars through an mpsc channel (one logical producer
//! per series; cross-series ingestion may be concurrent). The scheduler owns
//! its registry, so every append revalidates the monotonic-timestamp
//! invariant exactly as historical replay does.
//!
//! The one live-only wrinkle is the tie rule: a secondary bar at timestamp T
//! must not be emitted while the primary could still close a bar at T. The
//! wait is bounded by a grace period, and skipped outright when T does not
//! fall on a primary period boundary — never deadlock waiting for a primary
//! bar that cannot occur.

use crate::domain::{Bar, Periodicity, ScheduledEvent, SeriesIndex};
use crate::registry::{RegistryError, SeriesRegistry};
use chrono::NaiveDateTime;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};
use tracing::debug;

/// A message from a bar producer.
#[derive(Debug, Clone)]
pub enum BarFeedMessage {
    /// A closed bar for the given series.
    Bar(SeriesIndex, Bar),
    /// The given series will produce no further bars.
    Exhausted(SeriesIndex),
}

/// Live scheduling knobs.
#[derive(Debug, Clone, Copy)]
pub struct LiveConfig {
    /// Longest the scheduler will hold back a same-timestamp secondary bar
    /// while waiting for the primary bar at that timestamp.
    pub grace: Duration,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            grace: Duration::from_millis(250),
        }
    }
}

/// Streaming merge scheduler.
pub struct LiveScheduler {
    receiver: Receiver<BarFeedMessage>,
    registry: SeriesRegistry,
    cursors: Vec<usize>,
    exhausted: Vec<bool>,
    config: LiveConfig,
    /// Timestamp whose grace window already expired; no second wait for it.
    grace_spent: Option<NaiveDateTime>,
}

impl LiveScheduler {
    /// Register `periodicities` (primary first) and wrap the feed channel.
    pub fn new(
        receiver: Receiver<BarFeedMessage>,
        periodicities: &[Periodicity],
        config: LiveConfig,
    ) -> Result<Self, RegistryError> {
        let mut registry = SeriesRegistry::new();
        for periodicity in periodicities {
            registry.register_series(*periodicity)?;
        }
        let count = registry.series_count();
        Ok(Self {
            receiver,
            registry,
            cursors: vec![0; count],
            exhausted: vec![false; count],
            config,
            grace_spent: None,
        })
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn bar(&self, series: SeriesIndex, bar_index: usize) -> Option<&Bar> {
        self.registry.bar(series, bar_index)
    }

    /// Next event in the merged order, or `None` once every series is
    /// exhausted and all buffered bars have been emitted. Blocks while the
    /// stream is quiet; the only timestamp-ordering wait is grace-bounded.
    pub fn next_event(&mut self) -> Result<Option<ScheduledEvent>, RegistryError> {
        loop {
            self.drain_pending()?;

            let Some(next) = self.candidate() else {
                if self.all_exhausted() {
                    return Ok(None);
                }
                match self.receiver.recv() {
                    Ok(message) => self.apply(message)?,
                    Err(_) => self.mark_all_exhausted(),
                }
                continue;
            };

            let must_defer = !next.series.is_primary()
                && self.primary_may_close_at(next.timestamp)
                && self.grace_spent != Some(next.timestamp);

            if !must_defer {
                self.cursors[next.series.0] += 1;
                return Ok(Some(next));
            }

            // Bounded suspension: either the primary bar shows up and wins
            // the tie on the next pass, or the grace window expires and the
            // secondary proceeds alone.
            if !self.await_primary(next.timestamp)? {
                debug!(
                    timestamp = %next.timestamp,
                    "grace expired waiting for primary bar; proceeding with secondary"
                );
                self.grace_spent = Some(next.timestamp);
            }
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

    fn candidate(&self) -> Option<ScheduledEvent> {
        (0..self.cursors.len())
            .filter_map(|series| self.head(series))
            .min()
    }

    /// Whether the primary could still close a bar at `timestamp`.
    fn primary_may_close_at(&self, timestamp: NaiveDateTime) -> bool {
        if self.exhausted.first().copied().unwrap_or(true) {
            return false;
        }
        if let Some(last) = self.registry.last_timestamp(SeriesIndex::PRIMARY) {
            // The primary already reached or passed this timestamp.
            if last >= timestamp {
                return false;
            }
        }
        match self.registry.periodicity(SeriesIndex::PRIMARY) {
            Ok(periodicity) => periodicity.aligns(timestamp),
            Err(_) => false,
        }
    }

    /// Wait up to the grace period for a primary bar at or before
    /// `timestamp`. Returns true if the question was settled (bar arrived,
    /// boundary passed, or primary exhausted), false on grace expiry.
    fn await_primary(&mut self, timestamp: NaiveDateTime) -> Result<bool, RegistryError> {
        let deadline = Instant::now() + self.config.grace;
        loop {
            if !self.primary_may_close_at(timestamp) {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            match self.receiver.recv_timeout(deadline - now) {
                Ok(message) => self.apply(message)?,
                Err(RecvTimeoutError::Timeout) => return Ok(false),
                Err(RecvTimeoutError::Disconnected) => self.mark_all_exhausted(),
            }
        }
    }

    fn drain_pending(&mut self) -> Result<(), RegistryError> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => self.apply(message)?,
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => {
                    self.mark_all_exhausted();
                    return Ok(());
                }
            }
        }
    }

    fn apply(&mut self, message: BarFeedMessage) -> Result<(), RegistryError> {
        match message {
            BarFeedMessage::Bar(series, bar) => {
                self.registry.append_bar(series, bar)?;
            }
            BarFeedMessage::Exhausted(series) => {
                if let Some(flag) = self.exhausted.get_mut(series.0) {
                    *flag = true;
                }
            }
        }
        Ok(())
    }

    fn all_exhausted(&self) -> bool {
        self.exhausted.iter().all(|&done| done)
    }

    /// A dropped feed means no series will produce further bars.
    fn mark_all_exhausted(&mut self) {
        self.exhausted.iter_mut().for_each(|flag| *flag = true);
    }
}
