//! OrderIntent — a pending, not-yet-executed trading signal.

use super::ids::SeriesIndex;
use serde::{Deserialize, Serialize};

/// Trade direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

/// A signal produced on one series, awaiting execution on another.
///
/// Created by the signal evaluator while processing an `origin` series
/// event, resolved by the router on the `target` series' next bar-close
/// event, or discarded (and reported) if the target series never produces
/// another event. `sequence` is assigned by the router at submission and
/// preserves creation order among intents resolved on the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub origin: SeriesIndex,
    pub target: SeriesIndex,
    pub direction: Direction,
    pub quantity: u32,
    pub label: String,
    pub sequence: u64,
}
