//! Per-series, per-parameter indicator state with lookback queries.

use super::ema::Ema;
use crate::domain::SeriesIndex;
use std::collections::{HashMap, VecDeque};

/// One EMA plus the short history needed for lookback queries.
#[derive(Debug, Clone)]
struct EmaTrack {
    ema: Ema,
    /// Most recent value at the back; capped at `max_lookback + 1` entries.
    history: VecDeque<f64>,
}

impl EmaTrack {
    fn new(period: usize) -> Self {
        Self {
            ema: Ema::new(period),
            history: VecDeque::new(),
        }
    }
}

/// Holds recursive moving-average state keyed by `(series, period)`.
///
/// `update` must be called exactly once per bar-close of the owning series,
/// in scheduler order. Crossover queries use only values already computed;
/// they are false until both tracks have at least `lookback + 1` values.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    max_lookback: usize,
    tracks: HashMap<(SeriesIndex, usize), EmaTrack>,
}

impl IndicatorEngine {
    /// `max_lookback` bounds the oldest "N bars ago" query the engine can
    /// answer; the crossover strategy needs 1.
    pub fn new(max_lookback: usize) -> Self {
        Self {
            max_lookback,
            tracks: HashMap::new(),
        }
    }

    /// Fold a bar-close price into the `(series, period)` average and return
    /// the new value. Periods below 1 are silently floored.
    pub fn update(&mut self, series: SeriesIndex, period: usize, price: f64) -> f64 {
        let period = period.max(1);
        let track = self
            .tracks
            .entry((series, period))
            .or_insert_with(|| EmaTrack::new(period));
        let value = track.ema.update(price);
        track.history.push_back(value);
        if track.history.len() > self.max_lookback + 1 {
            track.history.pop_front();
        }
        value
    }

    /// Value of the `(series, period)` average `bars_ago` updates ago.
    /// `None` until enough updates have been seen, or past `max_lookback`.
    pub fn value(&self, series: SeriesIndex, period: usize, bars_ago: usize) -> Option<f64> {
        let track = self.tracks.get(&(series, period.max(1)))?;
        track
            .history
            .len()
            .checked_sub(bars_ago + 1)
            .and_then(|i| track.history.get(i))
            .copied()
    }

    /// True iff fast is above slow now and was at-or-below `lookback` bars ago.
    pub fn cross_above(
        &self,
        series: SeriesIndex,
        fast: usize,
        slow: usize,
        lookback: usize,
    ) -> bool {
        match self.cross_samples(series, fast, slow, lookback) {
            Some((fast_now, slow_now, fast_then, slow_then)) => {
                fast_now > slow_now && fast_then <= slow_then
            }
            None => false,
        }
    }

    /// True iff fast is below slow now and was at-or-above `lookback` bars ago.
    pub fn cross_below(
        &self,
        series: SeriesIndex,
        fast: usize,
        slow: usize,
        lookback: usize,
    ) -> bool {
        match self.cross_samples(series, fast, slow, lookback) {
            Some((fast_now, slow_now, fast_then, slow_then)) => {
                fast_now < slow_now && fast_then >= slow_then
            }
            None => false,
        }
    }

    fn cross_samples(
        &self,
        series: SeriesIndex,
        fast: usize,
        slow: usize,
        lookback: usize,
    ) -> Option<(f64, f64, f64, f64)> {
        Some((
            self.value(series, fast, 0)?,
            self.value(series, slow, 0)?,
            self.value(series, fast, lookback)?,
            self.value(series, slow, lookback)?,
        ))
    }
}
