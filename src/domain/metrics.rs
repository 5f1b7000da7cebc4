//! Performance summary computed from a completed trade log.

use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use super::position::Side;
use super::trade_log::{TradeLog, TradeRecord};

/// Aggregate performance of one replay.
///
/// "Trade" here always means a closed round trip; open records count
/// only toward durations and side tallies of the closes they pair with.
/// A log with no closes yields the zero summary (with the balances
/// filled in).
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub initial_balance: f64,
    pub final_balance: f64,
    /// (final - initial) / initial, as a percentage.
    pub total_return_pct: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: f64,
    pub total_profit: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// gross_profit / gross_loss. Infinite whenever there are closed
    /// trades and no losses; zero only for an empty log.
    pub profit_factor: f64,
    /// Largest peak-to-trough decline of the equity curve (initial
    /// balance plus cumulative realized profit), as a percentage of the
    /// peak. Zero or negative: -25.0 means the curve fell 25% below its
    /// peak.
    pub max_drawdown_pct: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub long_trades: usize,
    pub short_trades: usize,
    pub avg_trade_duration_hours: f64,
}

impl Summary {
    pub fn compute(initial_balance: f64, final_balance: f64, log: &TradeLog) -> Self {
        let closes: Vec<&TradeRecord> = log.closes().collect();
        let mut summary = Summary::zeroed(initial_balance, final_balance);
        if initial_balance > 0.0 {
            summary.total_return_pct =
                (final_balance - initial_balance) / initial_balance * 100.0;
        }
        if closes.is_empty() {
            return summary;
        }

        summary.total_trades = closes.len();

        // wins are strictly positive and losses at most zero, so the
        // 0.0 seeds of largest_win/largest_loss coincide with the
        // empty-subset convention
        for record in &closes {
            let profit = record.profit.unwrap_or(0.0);
            summary.total_profit += profit;
            if profit > 0.0 {
                summary.winning_trades += 1;
                summary.gross_profit += profit;
                summary.largest_win = summary.largest_win.max(profit);
            } else {
                summary.losing_trades += 1;
                summary.gross_loss += -profit;
                summary.largest_loss = summary.largest_loss.min(profit);
            }
            match record.kind.side() {
                Side::Long => summary.long_trades += 1,
                Side::Short => summary.short_trades += 1,
            }
        }

        if summary.winning_trades > 0 {
            summary.avg_win = summary.gross_profit / summary.winning_trades as f64;
        }
        if summary.losing_trades > 0 {
            summary.avg_loss = -summary.gross_loss / summary.losing_trades as f64;
        }

        summary.win_rate_pct = summary.winning_trades as f64 / closes.len() as f64 * 100.0;
        // closes is non-empty here, so zero gross loss means infinity
        // even when every close broke even
        summary.profit_factor = if summary.gross_loss > 0.0 {
            summary.gross_profit / summary.gross_loss
        } else {
            f64::INFINITY
        };
        summary.max_drawdown_pct = max_drawdown_pct(initial_balance, log);
        summary.avg_trade_duration_hours = avg_duration_hours(log);

        if !summary.total_profit.is_finite() || !summary.final_balance.is_finite() {
            warn!("non-finite values in trade log, reporting zero summary");
            return Summary::zeroed(initial_balance, final_balance);
        }
        summary
    }

    fn zeroed(initial_balance: f64, final_balance: f64) -> Self {
        Summary {
            initial_balance,
            final_balance,
            total_return_pct: 0.0,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate_pct: 0.0,
            total_profit: 0.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
            profit_factor: 0.0,
            max_drawdown_pct: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
            long_trades: 0,
            short_trades: 0,
            avg_trade_duration_hours: 0.0,
        }
    }
}

/// Drawdown over the equity curve: initial balance plus cumulative
/// realized profit in log order, with non-closing entries contributing
/// nothing. Returns the most negative `(equity - peak) / peak`
/// percentage; the running peak is non-decreasing by construction.
fn max_drawdown_pct(initial_balance: f64, log: &TradeLog) -> f64 {
    let mut equity = initial_balance;
    let mut peak = initial_balance;
    let mut max_dd = 0.0_f64;
    for record in log.closes() {
        equity += record.profit.unwrap_or(0.0);
        peak = peak.max(equity);
        if peak > 0.0 {
            max_dd = max_dd.min((equity - peak) / peak * 100.0);
        }
    }
    max_dd
}

/// Mean hours between each close and the open it settles. Valid because
/// an instrument carries at most one position at a time, so opens and
/// closes for a symbol alternate in the log.
fn avg_duration_hours(log: &TradeLog) -> f64 {
    let mut open_time: HashMap<&str, chrono::DateTime<chrono::Utc>> = HashMap::new();
    let mut total_hours = 0.0;
    let mut count = 0usize;

    for record in log.records() {
        if record.kind.is_close() {
            if let Some(opened) = open_time.remove(record.symbol.as_str()) {
                total_hours += (record.timestamp - opened).num_seconds() as f64 / 3600.0;
                count += 1;
            }
        } else {
            open_time.insert(record.symbol.as_str(), record.timestamp);
        }
    }

    if count == 0 {
        0.0
    } else {
        total_hours / count as f64
    }
}
