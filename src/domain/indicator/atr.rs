//! Average True Range over a rolling window of true ranges.
//!
//! The true range of bar i needs bar i-1's close, so the first defined
//! value sits at index `period`. A bar without high/low data breaks the
//! window: `None` until `period` consecutive true ranges are available
//! again.

use crate::domain::kline::Kline;

pub fn atr(klines: &[Kline], period: usize) -> Vec<Option<f64>> {
    if period == 0 || klines.len() <= period {
        return vec![None; klines.len()];
    }

    let mut true_ranges = vec![None; klines.len()];
    for i in 1..klines.len() {
        true_ranges[i] = klines[i].true_range(klines[i - 1].close);
    }

    let mut out = vec![None; klines.len()];
    for i in period..klines.len() {
        let window = &true_ranges[i + 1 - period..=i];
        if window.iter().all(Option::is_some) {
            let sum: f64 = window.iter().flatten().sum();
            out[i] = Some(sum / period as f64);
        }
    }

    out
}
