//! Streaming indicators.
//!
//! Unlike batch backtesters that precompute indicator columns, this engine
//! updates indicators incrementally: exactly one `update` per bar-close of
//! the owning series, in scheduler order. Crossover queries read only
//! already-computed values — no recomputation, so replaying the same bar
//! sequence twice yields identical trajectories.

pub mod ema;
pub mod engine;

pub use ema::Ema;
pub use engine::IndicatorEngine;

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-9;

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "expected {expected}, got {actual}"
    );
}
