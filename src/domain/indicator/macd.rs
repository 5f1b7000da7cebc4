//! Moving Average Convergence Divergence.
//!
//! MACD line = EMA(fast) - EMA(slow); signal line = EMA(signal) of the
//! MACD line, seeded with the simple mean of its first `signal_period`
//! defined values; histogram = line - signal.
//! Warmup: `slow - 1 + signal_period - 1` bars.

use super::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Vec<Option<MacdPoint>> {
    if fast == 0 || slow == 0 || signal_period == 0 {
        return vec![None; closes.len()];
    }

    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let line_start = slow.max(fast) - 1;
    let mut line = vec![None; closes.len()];
    for i in line_start..closes.len() {
        if let (Some(f), Some(s)) = (ema_fast[i], ema_slow[i]) {
            line[i] = Some(f - s);
        }
    }

    let seed_end = line_start + signal_period;
    if seed_end > closes.len() {
        return vec![None; closes.len()];
    }

    let k = 2.0 / (signal_period as f64 + 1.0);
    let mut out = vec![None; closes.len()];

    let seed_sum: f64 = line[line_start..seed_end].iter().flatten().sum();
    let mut signal = seed_sum / signal_period as f64;
    if let Some(l) = line[seed_end - 1] {
        out[seed_end - 1] = Some(MacdPoint {
            line: l,
            signal,
            histogram: l - signal,
        });
    }

    for i in seed_end..closes.len() {
        if let Some(l) = line[i] {
            signal = l * k + signal * (1.0 - k);
            out[i] = Some(MacdPoint {
                line: l,
                signal,
                histogram: l - signal,
            });
        }
    }

    out
}
