//! Session runners — one merged timeline driving the whole pipeline.
//!
//! Per event, in order: resolve pending intents targeting the event's series
//! (an intent always fills on its target's *next* event, never the event
//! that created it), then update the primary's indicators and evaluate the
//! crossover signal. Replay and live share this per-event pipeline, which is
//! what makes historical and streaming runs behave identically.

use crate::domain::{OrderIntent, Periodicity, ScheduledEvent};
use crate::indicators::IndicatorEngine;
use crate::registry::{RegistryError, SeriesRegistry};
use crate::router::{ExecutionHandler, Router, SubmitOutcome};
use crate::scheduler::{BarFeedMessage, LiveConfig, LiveScheduler, ReplayScheduler};
use crate::signal::{CrossoverParams, SignalEvaluator, StrategyConfig};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;

/// Counters and leftovers from one run. Serializable for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub events: usize,
    pub signals: usize,
    pub submitted: usize,
    pub duplicates_ignored: usize,
    pub flips: usize,
    pub executions: usize,
    /// Intents whose target series exhausted before their next event.
    pub unresolved: Vec<OrderIntent>,
}

/// Per-event pipeline shared by replay and live sessions.
struct Pipeline {
    params: CrossoverParams,
    indicators: IndicatorEngine,
    evaluator: SignalEvaluator,
    router: Router,
    report: RunReport,
}

impl Pipeline {
    fn new(config: StrategyConfig, target_periodicity: Periodicity) -> Self {
        Self {
            params: config.params,
            indicators: IndicatorEngine::new(config.params.lookback),
            evaluator: SignalEvaluator::new(config, target_periodicity),
            router: Router::new(),
            report: RunReport::default(),
        }
    }

    fn handle<H: ExecutionHandler>(
        &mut self,
        event: &ScheduledEvent,
        close: f64,
        handler: &mut H,
    ) {
        self.report.events += 1;

        // Pending intents targeting this series fill first.
        self.report.executions += self.router.on_event(event, handler).len();

        // Only the primary carries the crossover EMAs.
        if event.series.is_primary() {
            self.indicators.update(event.series, self.params.fast, close);
            self.indicators.update(event.series, self.params.slow, close);

            if let Some(intent) = self.evaluator.evaluate(event, &self.indicators) {
                self.report.signals += 1;
                match self.router.submit(intent) {
                    SubmitOutcome::Submitted => self.report.submitted += 1,
                    SubmitOutcome::DuplicateIgnored => self.report.duplicates_ignored += 1,
                    SubmitOutcome::Flipped => self.report.flips += 1,
                }
            }
        }
    }

    fn finish(mut self) -> RunReport {
        self.report.unresolved = self.router.drain_unresolved();
        self.report
    }
}

/// Drain a fully materialized registry through the pipeline.
pub fn run_replay<H: ExecutionHandler>(
    registry: &SeriesRegistry,
    config: StrategyConfig,
    handler: &mut H,
) -> Result<RunReport, RegistryError> {
    let target_periodicity = registry.periodicity(config.target)?;
    let mut pipeline = Pipeline::new(config, target_periodicity);

    for event in ReplayScheduler::new(registry) {
        let close = registry
            .bar(event.series, event.bar_index)
            .expect("scheduled events reference registry bars")
            .close;
        pipeline.handle(&event, close, handler);
    }

    Ok(pipeline.finish())
}

/// Drive a live feed to exhaustion through the same pipeline.
///
/// `periodicities` lists the primary first, then the secondaries in
/// registration order, matching the `SeriesIndex` values producers use.
pub fn run_live<H: ExecutionHandler>(
    receiver: Receiver<BarFeedMessage>,
    periodicities: &[Periodicity],
    config: StrategyConfig,
    live: LiveConfig,
    handler: &mut H,
) -> Result<RunReport, RegistryError> {
    let mut scheduler = LiveScheduler::new(receiver, periodicities, live)?;
    let target_periodicity = scheduler.registry().periodicity(config.target)?;
    let mut pipeline = Pipeline::new(config, target_periodicity);

    while let Some(event) = scheduler.next_event()? {
        let close = scheduler
            .bar(event.series, event.bar_index)
            .expect("scheduled events reference buffered bars")
            .close;
        pipeline.handle(&event, close, handler);
    }

    Ok(pipeline.finish())
}
