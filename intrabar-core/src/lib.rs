//! Intrabar Core — deterministic multi-series bar scheduling and routing.
//!
//! This crate replays bar-close events from several time series (one coarse
//! primary, one or more finer secondaries) in a strict, reproducible
//! interleaving, evaluates an EMA crossover on the primary, and routes the
//! resulting order intents to a secondary series for execution:
//! - Domain types (bars, periodicities, scheduled events, order intents)
//! - Append-only series registry with fail-fast configuration checks
//! - Merge scheduler, in replay and live (grace-bounded) forms
//! - Streaming indicator engine with lookback crossover queries
//! - Signal evaluator and intent router with duplicate/flip policy
//! - Session runners tying the pipeline together

pub mod domain;
pub mod indicators;
pub mod registry;
pub mod router;
pub mod scheduler;
pub mod session;
pub mod signal;
