//! Deterministic bar-by-bar replay over one instrument or a portfolio.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::exit::ExitPolicy;
use super::ledger::PositionLedger;
use super::series::{build_unified_timeline, SeriesData};
use super::trade_log::TradeLog;
use crate::ports::signal_port::SignalSource;

/// Whether exits or entries are processed first at each timestamp.
///
/// With `ExitsBeforeEntries` capital freed by an exit is available to
/// entries at the same timestamp; with `EntriesBeforeExits` it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickOrdering {
    #[default]
    ExitsBeforeEntries,
    EntriesBeforeExits,
}

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub initial_balance: f64,
    /// Fraction of the current balance committed per entry.
    pub risk_per_trade: f64,
    pub ordering: TickOrdering,
    pub exit_policy: ExitPolicy,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            initial_balance: 1000.0,
            risk_per_trade: 0.1,
            ordering: TickOrdering::default(),
            exit_policy: ExitPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub log: TradeLog,
    /// Symbols whose positions could not be force-closed for lack of a
    /// price. Normally empty.
    pub unpriced_positions: Vec<String>,
}

/// Replay a single instrument's bars in order.
pub fn run_single(
    series: &SeriesData,
    signals: &dyn SignalSource,
    config: &ReplayConfig,
) -> ReplayResult {
    info!(symbol = series.symbol(), bars = series.len(), "starting replay");
    let mut engine = Engine::new(config);
    for idx in 0..series.len() {
        let timestamp = series.klines()[idx].open_time;
        engine.tick(&[(series, idx)], timestamp, signals);
    }
    engine.finish()
}

/// Replay a portfolio over the sorted union of every series' timestamps.
///
/// At each timestamp only instruments with a bar at exactly that time
/// are visited, in the order the series were supplied. That order is
/// part of the deterministic contract: the same input in the same order
/// produces an identical trade log.
pub fn run_portfolio(
    series: &[SeriesData],
    signals: &dyn SignalSource,
    config: &ReplayConfig,
) -> ReplayResult {
    let timeline = build_unified_timeline(series);
    info!(
        instruments = series.len(),
        timestamps = timeline.len(),
        "starting portfolio replay"
    );

    let mut engine = Engine::new(config);
    let mut active: Vec<(&SeriesData, usize)> = Vec::with_capacity(series.len());
    for &timestamp in &timeline {
        active.clear();
        for s in series {
            if let Some(idx) = s.index_at(timestamp) {
                active.push((s, idx));
            }
        }
        engine.tick(&active, timestamp, signals);
    }
    engine.finish()
}

struct Engine<'a> {
    config: &'a ReplayConfig,
    ledger: PositionLedger,
    log: TradeLog,
    last_price: HashMap<String, (f64, DateTime<Utc>)>,
}

impl<'a> Engine<'a> {
    fn new(config: &'a ReplayConfig) -> Self {
        Engine {
            config,
            ledger: PositionLedger::new(config.initial_balance),
            log: TradeLog::new(),
            last_price: HashMap::new(),
        }
    }

    fn tick(
        &mut self,
        active: &[(&SeriesData, usize)],
        timestamp: DateTime<Utc>,
        signals: &dyn SignalSource,
    ) {
        for &(s, idx) in active {
            let k = &s.klines()[idx];
            self.last_price
                .insert(s.symbol().to_string(), (k.close, timestamp));
        }

        match self.config.ordering {
            TickOrdering::ExitsBeforeEntries => {
                self.exits_pass(active, timestamp, signals);
                self.entries_pass(active, timestamp, signals);
            }
            TickOrdering::EntriesBeforeExits => {
                self.entries_pass(active, timestamp, signals);
                self.exits_pass(active, timestamp, signals);
            }
        }
    }

    fn exits_pass(
        &mut self,
        active: &[(&SeriesData, usize)],
        timestamp: DateTime<Utc>,
        signals: &dyn SignalSource,
    ) {
        for &(s, idx) in active {
            let symbol = s.symbol();
            let Some(position) = self.ledger.position_mut(symbol) else {
                continue;
            };
            let signal = signals.signal(symbol, timestamp);
            let verdict = self
                .config
                .exit_policy
                .evaluate(position, s.klines(), idx, signal);
            if let Some(reason) = verdict {
                let price = s.klines()[idx].close;
                self.ledger
                    .close(&mut self.log, symbol, price, timestamp, reason);
            }
        }
    }

    fn entries_pass(
        &mut self,
        active: &[(&SeriesData, usize)],
        timestamp: DateTime<Utc>,
        signals: &dyn SignalSource,
    ) {
        for &(s, idx) in active {
            let symbol = s.symbol();
            if self.ledger.has_position(symbol) {
                continue;
            }
            let signal = signals.signal(symbol, timestamp);
            if signal.is_entry() {
                let price = s.klines()[idx].close;
                self.ledger.open(
                    &mut self.log,
                    symbol,
                    signal,
                    price,
                    timestamp,
                    self.config.risk_per_trade,
                );
            }
        }
    }

    fn finish(mut self) -> ReplayResult {
        let closed = self
            .ledger
            .force_close_all(&mut self.log, &self.last_price);
        if closed > 0 {
            info!(closed, "force-closed remaining positions at end of data");
        }

        let mut unpriced: Vec<String> = self
            .ledger
            .open_positions()
            .map(|p| p.symbol.clone())
            .collect();
        unpriced.sort();
        if !unpriced.is_empty() {
            warn!(symbols = ?unpriced, "positions left open without a final price");
        }

        info!(
            final_balance = self.ledger.balance(),
            trades = self.log.len(),
            "replay finished"
        );
        ReplayResult {
            initial_balance: self.config.initial_balance,
            final_balance: self.ledger.balance(),
            log: self.log,
            unpriced_positions: unpriced,
        }
    }
}
