//! Open position state.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Long,
    Short,
}

/// One open, sized exposure to a single instrument.
///
/// Every field except the trailing extrema is fixed at open time. The
/// extrema exist only for the trailing-stop rule: created lazily on its
/// first evaluation and ratcheted monotonically from then on (max for
/// Long, min for Short). Positions are created and destroyed only by the
/// [`PositionLedger`](super::ledger::PositionLedger).
#[derive(Debug, Clone)]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    /// Capital committed at entry, escrowed out of the free balance.
    pub usd_in: f64,
    /// Units acquired: `usd_in / entry_price`.
    pub qty: f64,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub highest_price: Option<f64>,
    pub lowest_price: Option<f64>,
}

/// Realized outcome of closing a position at `exit_price`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    /// Realized profit or loss.
    pub profit: f64,
    /// Amount credited back to the free balance.
    pub balance_credit: f64,
}

impl Position {
    pub fn new(
        symbol: String,
        side: Side,
        usd_in: f64,
        entry_price: f64,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Position {
            symbol,
            side,
            usd_in,
            qty: usd_in / entry_price,
            entry_price,
            entry_time,
            highest_price: None,
            lowest_price: None,
        }
    }

    /// Hours held at `now`.
    pub fn hold_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.entry_time).num_seconds() as f64 / 3600.0
    }

    /// Payoff at `exit_price`, identical for rule-triggered and forced
    /// closes.
    ///
    /// Long: proceeds = qty * exit, profit = proceeds - usd_in, and the
    /// proceeds are credited back.
    ///
    /// Short: the notional was locked at entry value. profit =
    /// qty * entry - qty * exit, and the credit returns the escrowed
    /// usd_in plus that mark-to-market gain/loss (cash-settled short).
    pub fn settle(&self, exit_price: f64) -> Settlement {
        match self.side {
            Side::Long => {
                let proceeds = self.qty * exit_price;
                Settlement {
                    profit: proceeds - self.usd_in,
                    balance_credit: proceeds,
                }
            }
            Side::Short => {
                let locked = self.qty * self.entry_price;
                let current = self.qty * exit_price;
                Settlement {
                    profit: locked - current,
                    balance_credit: locked - current + self.usd_in,
                }
            }
        }
    }

    /// Ratchet the trailing extremum toward the more favorable price and
    /// return its current value. Updates happen on every call, whether or
    /// not a stop later fires.
    pub fn update_extremum(&mut self, price: f64) -> f64 {
        match self.side {
            Side::Long => {
                let best = self.highest_price.map_or(price, |h| h.max(price));
                self.highest_price = Some(best);
                best
            }
            Side::Short => {
                let best = self.lowest_price.map_or(price, |l| l.min(price));
                self.lowest_price = Some(best);
                best
            }
        }
    }
}
