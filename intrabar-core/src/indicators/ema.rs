//! Exponential Moving Average (EMA), streaming form.
//!
//! Recursive: v' = v + alpha * (price - v), alpha = 2 / (period + 1).
//! Seed: the first price seen.

/// Single-pole recursive average over a stream of prices.
///
/// The period is silently floored to 1 at construction; a period of 1 makes
/// the EMA track the price exactly (alpha = 1).
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    value: Option<f64>,
    count: u64,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            value: None,
            count: 0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Fold one price into the average and return the new value.
    pub fn update(&mut self, price: f64) -> f64 {
        let next = match self.value {
            None => price,
            Some(v) => v + self.alpha * (price - v),
        };
        self.value = Some(next);
        self.count += 1;
        next
    }

    /// Current value, `None` before the first update.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Number of updates folded in so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}
