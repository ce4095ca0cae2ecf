//! Crossover signal evaluator.
//!
//! Watches primary-series events only. When the fast EMA crosses above the
//! slow EMA it produces a Long intent targeting the configured secondary
//! series; a cross below produces the Short counterpart. Events on any
//! non-primary series are ignored by design, not an error.

use crate::domain::{Direction, OrderIntent, Periodicity, ScheduledEvent, SeriesIndex};
use crate::indicators::IndicatorEngine;
use serde::{Deserialize, Serialize};

/// Fast/slow EMA lengths and the crossover lookback offset.
///
/// Lengths below 1 are silently floored to 1 — the permissive setter policy;
/// misconfiguration never raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverParams {
    pub fast: usize,
    pub slow: usize,
    pub lookback: usize,
}

impl CrossoverParams {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self {
            fast: fast.max(1),
            slow: slow.max(1),
            lookback: 1,
        }
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback.max(1);
        self
    }
}

impl Default for CrossoverParams {
    fn default() -> Self {
        Self::new(10, 25)
    }
}

/// What to trade when a crossover fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub params: CrossoverParams,
    /// Execution series for emitted intents; must differ from the primary.
    pub target: SeriesIndex,
    pub quantity: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            params: CrossoverParams::default(),
            target: SeriesIndex(1),
            quantity: 1,
        }
    }
}

/// Stateless per-event evaluator; pending-intent policy lives in the router.
#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    config: StrategyConfig,
    long_label: String,
    short_label: String,
}

impl SignalEvaluator {
    /// `target_periodicity` only feeds the order labels, e.g. "Long: 1min".
    pub fn new(config: StrategyConfig, target_periodicity: Periodicity) -> Self {
        Self {
            config,
            long_label: format!("Long: {target_periodicity}"),
            short_label: format!("Short: {target_periodicity}"),
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Evaluate one scheduled event against already-computed indicator
    /// values. Returns a candidate intent with `sequence` unset; the router
    /// assigns it at submission.
    pub fn evaluate(
        &self,
        event: &ScheduledEvent,
        indicators: &IndicatorEngine,
    ) -> Option<OrderIntent> {
        // Secondary bar updates carry no signal logic.
        if !event.series.is_primary() {
            return None;
        }

        let CrossoverParams {
            fast,
            slow,
            lookback,
        } = self.config.params;

        let direction = if indicators.cross_above(event.series, fast, slow, lookback) {
            Direction::Long
        } else if indicators.cross_below(event.series, fast, slow, lookback) {
            Direction::Short
        } else {
            return None;
        };

        let label = match direction {
            Direction::Long => self.long_label.clone(),
            Direction::Short => self.short_label.clone(),
        };

        Some(OrderIntent {
            origin: event.series,
            target: self.config.target,
            direction,
            quantity: self.config.quantity,
            label,
            sequence: 0,
        })
    }
}
