//! Kline (candlestick bar) representation.

use chrono::{DateTime, Utc};

/// One OHLC(V) sample for an instrument at a timestamp.
///
/// Only `close` is mandatory: the default momentum strategy works from
/// closes alone, and open/high/low/volume are carried only for rules that
/// need them (ATR-based stops). Bars for one instrument are strictly
/// ordered by `open_time`; bars across instruments need not align.
#[derive(Debug, Clone)]
pub struct Kline {
    pub symbol: String,
    pub open_time: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Kline {
    /// max(high - low, |high - prev_close|, |low - prev_close|).
    ///
    /// `None` when the bar carries no high/low data.
    pub fn true_range(&self, prev_close: f64) -> Option<f64> {
        let high = self.high?;
        let low = self.low?;
        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();
        Some(hl.max(hc).max(lc))
    }
}
