//! Series registry — owns the append-only bar series.
//!
//! Registration assigns indices: 0 for the primary (first registration),
//! 1..K for secondaries in registration order. Every secondary must be
//! strictly finer-grained than the primary; the check runs at registration
//! time, before any events flow. Appends enforce strictly increasing
//! timestamps per series, which is what lets the scheduler guarantee it
//! never regresses once advanced.

use crate::domain::{Bar, Periodicity, SeriesIndex};
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("series {series}: bar at {offered} does not advance past {last}")]
    OutOfOrderBar {
        series: SeriesIndex,
        last: NaiveDateTime,
        offered: NaiveDateTime,
    },

    #[error("secondary periodicity {offered} must be strictly finer than primary {primary}")]
    InvalidSeriesConfiguration {
        primary: Periodicity,
        offered: Periodicity,
    },

    #[error("unknown series index {0}")]
    UnknownSeries(SeriesIndex),

    #[error("series {series}: bar at {timestamp} fails OHLC sanity check")]
    MalformedBar {
        series: SeriesIndex,
        timestamp: NaiveDateTime,
    },
}

/// One registered series: a periodicity and its closed bars.
#[derive(Debug, Clone)]
pub struct Series {
    periodicity: Periodicity,
    bars: Vec<Bar>,
}

impl Series {
    fn new(periodicity: Periodicity) -> Self {
        Self {
            periodicity,
            bars: Vec::new(),
        }
    }

    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.bars.last().map(|b| b.timestamp)
    }
}

/// Registry of all series feeding one merged timeline.
#[derive(Debug, Clone, Default)]
pub struct SeriesRegistry {
    series: Vec<Series>,
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a series and return its index. The first registration is the
    /// primary; every later one must be strictly finer-grained than it.
    pub fn register_series(
        &mut self,
        periodicity: Periodicity,
    ) -> Result<SeriesIndex, RegistryError> {
        if let Some(primary) = self.series.first() {
            if !periodicity.is_finer_than(&primary.periodicity) {
                return Err(RegistryError::InvalidSeriesConfiguration {
                    primary: primary.periodicity,
                    offered: periodicity,
                });
            }
        }
        let index = SeriesIndex(self.series.len());
        self.series.push(Series::new(periodicity));
        Ok(index)
    }

    /// Append a closed bar and return its index within the series.
    pub fn append_bar(&mut self, series: SeriesIndex, bar: Bar) -> Result<usize, RegistryError> {
        let slot = self
            .series
            .get_mut(series.0)
            .ok_or(RegistryError::UnknownSeries(series))?;

        if !bar.is_sane() {
            return Err(RegistryError::MalformedBar {
                series,
                timestamp: bar.timestamp,
            });
        }

        if let Some(last) = slot.last_timestamp() {
            if bar.timestamp <= last {
                return Err(RegistryError::OutOfOrderBar {
                    series,
                    last,
                    offered: bar.timestamp,
                });
            }
        }

        slot.bars.push(bar);
        Ok(slot.bars.len() - 1)
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn series(&self, index: SeriesIndex) -> Option<&Series> {
        self.series.get(index.0)
    }

    pub fn periodicity(&self, series: SeriesIndex) -> Result<Periodicity, RegistryError> {
        self.series
            .get(series.0)
            .map(|s| s.periodicity)
            .ok_or(RegistryError::UnknownSeries(series))
    }

    pub fn bars(&self, series: SeriesIndex) -> Result<&[Bar], RegistryError> {
        self.series
            .get(series.0)
            .map(|s| s.bars())
            .ok_or(RegistryError::UnknownSeries(series))
    }

    pub fn bar(&self, series: SeriesIndex, bar_index: usize) -> Option<&Bar> {
        self.series.get(series.0).and_then(|s| s.bars.get(bar_index))
    }

    pub fn len(&self, series: SeriesIndex) -> Result<usize, RegistryError> {
        self.series
            .get(series.0)
            .map(|s| s.len())
            .ok_or(RegistryError::UnknownSeries(series))
    }

    pub fn last_timestamp(&self, series: SeriesIndex) -> Option<NaiveDateTime> {
        self.series.get(series.0).and_then(|s| s.last_timestamp())
    }
}
