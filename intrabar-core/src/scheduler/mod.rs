//! Merge scheduler — the single global ordering over bar-close events.
//!
//! Both schedulers honor the same contract: events come out in
//! non-decreasing timestamp order, and on equal timestamps the lower series
//! index wins (primary before any secondary, secondaries in registration
//! order). Replay drains fully materialized series; live applies the same
//! rule to a stream, with a bounded grace wait before a same-timestamp
//! secondary may overtake a primary that has not arrived yet.

pub mod live;
pub mod replay;

pub use live::{BarFeedMessage, LiveConfig, LiveScheduler};
pub use replay::ReplayScheduler;
