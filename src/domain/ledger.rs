//! Balance and open-position bookkeeping.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::position::{Position, Side};
use super::signal::Signal;
use super::trade_log::{CloseReason, TradeKind, TradeLog, TradeRecord};

/// Smallest notional worth opening. Entries sized below this are skipped.
pub const MIN_NOTIONAL: f64 = 0.01;

/// Free balance plus at most one open position per instrument.
///
/// All capital movement goes through [`open`](PositionLedger::open),
/// [`close`](PositionLedger::close) and
/// [`force_close_all`](PositionLedger::force_close_all), each of which
/// appends a matching record to the trade log so the balance is always
/// reconstructible from the log alone.
#[derive(Debug, Clone)]
pub struct PositionLedger {
    balance: f64,
    positions: HashMap<String, Position>,
}

impl PositionLedger {
    pub fn new(initial_balance: f64) -> Self {
        PositionLedger {
            balance: initial_balance,
            positions: HashMap::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn position_mut(&mut self, symbol: &str) -> Option<&mut Position> {
        self.positions.get_mut(symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn open_count(&self) -> usize {
        self.positions.len()
    }

    /// Open a position sized at `risk_fraction` of the current balance.
    ///
    /// No-ops (returning false) on a `Hold` signal, when the instrument
    /// already has a position, or when the sized notional falls below
    /// [`MIN_NOTIONAL`].
    pub fn open(
        &mut self,
        log: &mut TradeLog,
        symbol: &str,
        signal: Signal,
        price: f64,
        timestamp: DateTime<Utc>,
        risk_fraction: f64,
    ) -> bool {
        let side = match signal {
            Signal::Buy => Side::Long,
            Signal::Sell => Side::Short,
            Signal::Hold => return false,
        };
        if self.positions.contains_key(symbol) {
            return false;
        }
        let usd_in = self.balance * risk_fraction;
        if usd_in < MIN_NOTIONAL {
            debug!(symbol, usd_in, "entry below minimum notional, skipping");
            return false;
        }

        let position = Position::new(symbol.to_string(), side, usd_in, price, timestamp);
        self.balance -= usd_in;
        log.push(TradeRecord {
            timestamp,
            symbol: symbol.to_string(),
            kind: TradeKind::open(side),
            price,
            qty: position.qty,
            usd_flow: -usd_in,
            balance: self.balance,
            profit: None,
            reason: None,
        });
        debug!(symbol, %signal, price, usd_in, "opened position");
        self.positions.insert(symbol.to_string(), position);
        true
    }

    /// Close the position on `symbol` at `price`, crediting the proceeds
    /// back to the balance. Returns the realized profit, or `None` when no
    /// position exists.
    pub fn close(
        &mut self,
        log: &mut TradeLog,
        symbol: &str,
        price: f64,
        timestamp: DateTime<Utc>,
        reason: CloseReason,
    ) -> Option<f64> {
        let position = self.positions.remove(symbol)?;
        let settlement = position.settle(price);
        self.balance += settlement.balance_credit;
        log.push(TradeRecord {
            timestamp,
            symbol: symbol.to_string(),
            kind: TradeKind::close(position.side),
            price,
            qty: position.qty,
            usd_flow: settlement.balance_credit,
            balance: self.balance,
            profit: Some(settlement.profit),
            reason: Some(reason),
        });
        debug!(symbol, %reason, price, profit = settlement.profit, "closed position");
        Some(settlement.profit)
    }

    /// Force-close every remaining position at its last known price.
    ///
    /// Positions whose symbol has no entry in `last_price` stay open and
    /// are reported by the caller as unpriced. Returns the number of
    /// positions closed. Calling again with the same prices is a no-op.
    pub fn force_close_all(
        &mut self,
        log: &mut TradeLog,
        last_price: &HashMap<String, (f64, DateTime<Utc>)>,
    ) -> usize {
        let mut symbols: Vec<String> = self.positions.keys().cloned().collect();
        symbols.sort();

        let mut closed = 0;
        for symbol in symbols {
            let Some(&(price, timestamp)) = last_price.get(&symbol) else {
                warn!(symbol = %symbol, "no price available to force-close position");
                continue;
            };
            // remove cannot fail: symbol came from the key set above
            if let Some(position) = self.positions.remove(&symbol) {
                let settlement = position.settle(price);
                self.balance += settlement.balance_credit;
                log.push(TradeRecord {
                    timestamp,
                    symbol: symbol.clone(),
                    kind: TradeKind::force(position.side),
                    price,
                    qty: position.qty,
                    usd_flow: settlement.balance_credit,
                    balance: self.balance,
                    profit: Some(settlement.profit),
                    reason: None,
                });
                debug!(symbol = %symbol, price, profit = settlement.profit, "force-closed position");
                closed += 1;
            }
        }
        closed
    }
}
