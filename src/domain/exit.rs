//! Exit rule chain evaluated against each open position on every bar.

use super::kline::Kline;
use super::position::{Position, Side};
use super::signal::Signal;
use super::trade_log::CloseReason;

pub const DEFAULT_TAKE_PROFIT_PCT: f64 = 0.20;
pub const DEFAULT_TRAILING_STOP_PCT: f64 = 0.15;
pub const DEFAULT_MAX_HOLD_HOURS: f64 = 48.0;

/// One condition that can close a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitRule {
    /// The signal source flipped against the position.
    OppositeSignal,
    /// Unrealized return reached `pct` of the entry price.
    TakeProfit { pct: f64 },
    /// Price retraced `pct` from the most favorable price seen since
    /// entry.
    TrailingStop { pct: f64 },
    /// The position has been held for `max_hold_hours` or longer.
    TimeExit { max_hold_hours: f64 },
    /// Price moved `multiplier` ATRs against the entry. Never fires
    /// while the ATR window is undefined.
    VolatilityStop { period: usize, multiplier: f64 },
}

/// Ordered rule chain. The first rule whose condition holds decides the
/// close reason; later rules are not consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitPolicy {
    pub rules: Vec<ExitRule>,
}

impl Default for ExitPolicy {
    fn default() -> Self {
        ExitPolicy {
            rules: vec![
                ExitRule::OppositeSignal,
                ExitRule::TakeProfit {
                    pct: DEFAULT_TAKE_PROFIT_PCT,
                },
                ExitRule::TrailingStop {
                    pct: DEFAULT_TRAILING_STOP_PCT,
                },
                ExitRule::TimeExit {
                    max_hold_hours: DEFAULT_MAX_HOLD_HOURS,
                },
            ],
        }
    }
}

impl ExitPolicy {
    /// Decide whether the position should close on the bar at `idx`.
    ///
    /// Side effect: a trailing-stop rule ratchets the position's
    /// extremum on every evaluation it reaches, whether or not it
    /// fires.
    pub fn evaluate(
        &self,
        position: &mut Position,
        klines: &[Kline],
        idx: usize,
        signal: Signal,
    ) -> Option<CloseReason> {
        let price = klines[idx].close;
        let now = klines[idx].open_time;

        for rule in &self.rules {
            let fired = match *rule {
                ExitRule::OppositeSignal => match position.side {
                    Side::Long => signal == Signal::Sell,
                    Side::Short => signal == Signal::Buy,
                },
                ExitRule::TakeProfit { pct } => {
                    let gain = match position.side {
                        Side::Long => (price - position.entry_price) / position.entry_price,
                        Side::Short => (position.entry_price - price) / position.entry_price,
                    };
                    gain >= pct
                }
                ExitRule::TrailingStop { pct } => {
                    let best = position.update_extremum(price);
                    match position.side {
                        Side::Long => price <= best * (1.0 - pct),
                        Side::Short => price >= best * (1.0 + pct),
                    }
                }
                ExitRule::TimeExit { max_hold_hours } => position.hold_hours(now) >= max_hold_hours,
                ExitRule::VolatilityStop { period, multiplier } => {
                    match atr_at(klines, idx, period) {
                        Some(atr) => match position.side {
                            Side::Long => price <= position.entry_price - multiplier * atr,
                            Side::Short => price >= position.entry_price + multiplier * atr,
                        },
                        None => false,
                    }
                }
            };
            if fired {
                return Some(rule_reason(*rule));
            }
        }
        None
    }
}

fn rule_reason(rule: ExitRule) -> CloseReason {
    match rule {
        ExitRule::OppositeSignal => CloseReason::OppositeSignal,
        ExitRule::TakeProfit { .. } => CloseReason::TakeProfit,
        ExitRule::TrailingStop { .. } => CloseReason::TrailingStop,
        ExitRule::TimeExit { .. } => CloseReason::TimeExit,
        ExitRule::VolatilityStop { .. } => CloseReason::VolatilityStop,
    }
}

/// ATR at a single bar, from the `period` true ranges ending there.
/// `None` during warmup or when any bar in the window lacks high/low.
fn atr_at(klines: &[Kline], idx: usize, period: usize) -> Option<f64> {
    if period == 0 || idx < period {
        return None;
    }
    let mut sum = 0.0;
    for i in idx + 1 - period..=idx {
        sum += klines[i].true_range(klines[i - 1].close)?;
    }
    Some(sum / period as f64)
}
