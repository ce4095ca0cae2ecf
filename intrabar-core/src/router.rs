//! Router — defers order intents to their target series' next event.
//!
//! An intent produced while processing series i resolves on series j's next
//! bar-closed event in scheduler order, never earlier. Pending intents are
//! keyed by target series; resolution preserves creation order. The
//! duplicate/flip policy for competing intents on the same (origin, target)
//! pair lives here so the evaluator stays stateless: a same-direction
//! candidate is silently dropped, an opposite-direction candidate cancels
//! the pending intent and takes its place.

use crate::domain::{Direction, OrderIntent, ScheduledEvent, SeriesIndex};
use std::collections::BTreeMap;
use tracing::warn;

/// The external execution collaborator. Fire-and-forget per intent; fills
/// are assumed immediate at the open of the routed bar.
pub trait ExecutionHandler {
    fn execute(&mut self, series: SeriesIndex, direction: Direction, quantity: u32, label: &str);
}

/// What `Router::submit` did with a candidate intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No intent was pending for this (origin, target) pair; now one is.
    Submitted,
    /// A same-direction intent was already pending; the candidate was dropped.
    DuplicateIgnored,
    /// An opposite-direction intent was pending; it was cancelled and replaced.
    Flipped,
}

#[derive(Debug, Default)]
pub struct Router {
    /// Pending intents per target series, in submission (sequence) order.
    pending: BTreeMap<SeriesIndex, Vec<OrderIntent>>,
    next_sequence: u64,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the duplicate/flip policy and enqueue the intent if it survives.
    pub fn submit(&mut self, mut intent: OrderIntent) -> SubmitOutcome {
        let queue = self.pending.entry(intent.target).or_default();
        let outcome = match queue.iter().position(|p| p.origin == intent.origin) {
            Some(i) if queue[i].direction == intent.direction => {
                return SubmitOutcome::DuplicateIgnored;
            }
            Some(i) => {
                queue.remove(i);
                SubmitOutcome::Flipped
            }
            None => SubmitOutcome::Submitted,
        };

        intent.sequence = self.next_sequence;
        self.next_sequence += 1;
        queue.push(intent);
        outcome
    }

    /// Resolve every intent targeting the event's series, invoking the
    /// execution collaborator exactly once per intent. Returns the resolved
    /// intents (useful for reporting; callers may ignore them).
    pub fn on_event<H: ExecutionHandler>(
        &mut self,
        event: &ScheduledEvent,
        handler: &mut H,
    ) -> Vec<OrderIntent> {
        let Some(mut queue) = self.pending.remove(&event.series) else {
            return Vec::new();
        };
        // A flip re-enqueues at the back, so sequence order is push order;
        // sorting keeps the creation-order guarantee explicit.
        queue.sort_by_key(|intent| intent.sequence);
        for intent in &queue {
            handler.execute(intent.target, intent.direction, intent.quantity, &intent.label);
        }
        queue
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Remove and return every still-pending intent at stream exhaustion.
    /// Each is reported as a warning; an unresolved intent is never fatal.
    pub fn drain_unresolved(&mut self) -> Vec<OrderIntent> {
        let mut unresolved: Vec<OrderIntent> = self
            .pending
            .iter_mut()
            .flat_map(|(_, queue)| queue.drain(..))
            .collect();
        self.pending.clear();
        unresolved.sort_by_key(|intent| intent.sequence);
        for intent in &unresolved {
            warn!(
                origin = %intent.origin,
                target = %intent.target,
                direction = ?intent.direction,
                label = %intent.label,
                "intent never reached its target series before exhaustion"
            );
        }
        unresolved
    }
}
