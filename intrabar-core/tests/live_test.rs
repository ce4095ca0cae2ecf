//! Live-session tests: streaming ingestion must reproduce replay behavior.

use chrono::{NaiveDate, NaiveDateTime};
use intrabar_core::domain::{Bar, Direction, Periodicity, SeriesIndex};
use intrabar_core::registry::SeriesRegistry;
use intrabar_core::router::ExecutionHandler;
use intrabar_core::scheduler::{BarFeedMessage, LiveConfig};
use intrabar_core::session::{run_live, run_replay};
use intrabar_core::signal::{CrossoverParams, StrategyConfig};
use std::sync::mpsc;
use std::time::Duration;

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn bar(ts: NaiveDateTime, close: f64) -> Bar {
    Bar {
        timestamp: ts,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000,
    }
}

#[derive(Default)]
struct RecordingHandler {
    calls: Vec<(SeriesIndex, Direction, u32, String)>,
}

impl ExecutionHandler for RecordingHandler {
    fn execute(&mut self, series: SeriesIndex, direction: Direction, quantity: u32, label: &str) {
        self.calls.push((series, direction, quantity, label.into()));
    }
}

fn config() -> StrategyConfig {
    StrategyConfig {
        params: CrossoverParams::new(1, 2),
        target: SeriesIndex(1),
        quantity: 1,
    }
}

fn periodicities() -> Vec<Periodicity> {
    vec![Periodicity::minutes(5), Periodicity::minutes(1)]
}

/// Primary closes 10 then 11 produce one cross-above; the secondary's 12:05
/// bar resolves it.
fn scenario_bars() -> (Vec<Bar>, Vec<Bar>) {
    let primary = vec![bar(at(12, 0), 10.0), bar(at(12, 5), 11.0)];
    let secondary = vec![
        bar(at(12, 0), 10.0),
        bar(at(12, 1), 10.0),
        bar(at(12, 2), 10.0),
        bar(at(12, 3), 10.0),
        bar(at(12, 4), 10.0),
        bar(at(12, 5), 10.0),
    ];
    (primary, secondary)
}

#[test]
fn live_run_matches_replay_of_the_same_bars() {
    let (primary_bars, secondary_bars) = scenario_bars();

    // Replay reference.
    let mut reg = SeriesRegistry::new();
    let p = reg.register_series(Periodicity::minutes(5)).unwrap();
    let s = reg.register_series(Periodicity::minutes(1)).unwrap();
    for b in &primary_bars {
        reg.append_bar(p, b.clone()).unwrap();
    }
    for b in &secondary_bars {
        reg.append_bar(s, b.clone()).unwrap();
    }
    let mut replay_handler = RecordingHandler::default();
    let replay_report = run_replay(&reg, config(), &mut replay_handler).unwrap();

    // Live run over the same bars, interleaved by producer threads.
    let (tx, rx) = mpsc::channel();
    let tx2 = tx.clone();
    let primary_feed = std::thread::spawn(move || {
        for b in primary_bars {
            tx.send(BarFeedMessage::Bar(SeriesIndex(0), b)).unwrap();
        }
        tx.send(BarFeedMessage::Exhausted(SeriesIndex(0))).unwrap();
    });
    let secondary_feed = std::thread::spawn(move || {
        for b in secondary_bars {
            tx2.send(BarFeedMessage::Bar(SeriesIndex(1), b)).unwrap();
        }
        tx2.send(BarFeedMessage::Exhausted(SeriesIndex(1))).unwrap();
    });

    let mut live_handler = RecordingHandler::default();
    let live_report = run_live(
        rx,
        &periodicities(),
        config(),
        LiveConfig {
            grace: Duration::from_secs(5),
        },
        &mut live_handler,
    )
    .unwrap();

    primary_feed.join().unwrap();
    secondary_feed.join().unwrap();

    assert_eq!(live_report, replay_report);
    assert_eq!(live_handler.calls, replay_handler.calls);
    assert_eq!(live_report.executions, 1);
    assert_eq!(live_handler.calls[0].1, Direction::Long);
}

#[test]
fn secondary_sent_first_still_waits_for_same_timestamp_primary() {
    let (tx, rx) = mpsc::channel();
    // Reverse arrival order at 12:00; the grace wait must restore the tie rule.
    tx.send(BarFeedMessage::Bar(SeriesIndex(1), bar(at(12, 0), 10.0)))
        .unwrap();
    tx.send(BarFeedMessage::Bar(SeriesIndex(0), bar(at(12, 0), 10.0)))
        .unwrap();
    tx.send(BarFeedMessage::Bar(SeriesIndex(1), bar(at(12, 1), 10.0)))
        .unwrap();
    tx.send(BarFeedMessage::Exhausted(SeriesIndex(0))).unwrap();
    tx.send(BarFeedMessage::Exhausted(SeriesIndex(1))).unwrap();
    drop(tx);

    let mut handler = RecordingHandler::default();
    let report = run_live(
        rx,
        &periodicities(),
        config(),
        LiveConfig {
            grace: Duration::from_secs(5),
        },
        &mut handler,
    )
    .unwrap();

    // 3 events processed; no signal fires (too little primary history).
    assert_eq!(report.events, 3);
    assert_eq!(report.signals, 0);
}

#[test]
fn intent_created_after_target_exhaustion_is_reported_not_fatal() {
    let (tx, rx) = mpsc::channel();
    // The secondary exhausts before the primary's cross-above at 12:05.
    tx.send(BarFeedMessage::Bar(SeriesIndex(1), bar(at(12, 0), 10.0)))
        .unwrap();
    tx.send(BarFeedMessage::Exhausted(SeriesIndex(1))).unwrap();
    tx.send(BarFeedMessage::Bar(SeriesIndex(0), bar(at(12, 0), 10.0)))
        .unwrap();
    tx.send(BarFeedMessage::Bar(SeriesIndex(0), bar(at(12, 5), 11.0)))
        .unwrap();
    tx.send(BarFeedMessage::Exhausted(SeriesIndex(0))).unwrap();
    drop(tx);

    let mut handler = RecordingHandler::default();
    let report = run_live(
        rx,
        &periodicities(),
        config(),
        LiveConfig {
            grace: Duration::from_millis(10),
        },
        &mut handler,
    )
    .unwrap();

    assert_eq!(report.signals, 1);
    assert_eq!(report.executions, 0);
    assert!(handler.calls.is_empty());
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].direction, Direction::Long);
}
