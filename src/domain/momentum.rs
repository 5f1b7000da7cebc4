//! Reference momentum signal source: RSI extremes confirmed by a MACD
//! crossover.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use super::indicator::{macd, rsi, DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use super::series::SeriesData;
use super::signal::Signal;
use crate::ports::signal_port::SignalSource;

#[derive(Debug, Clone)]
pub struct MomentumParams {
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for MomentumParams {
    fn default() -> Self {
        MomentumParams {
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
        }
    }
}

/// Signals precomputed for every bar of every series.
///
/// Buy: RSI below `oversold` while the MACD line crosses above its
/// signal line on the same bar. Sell: RSI above `overbought` on a cross
/// below. Everything else, including any bar where an indicator is
/// still warming up, is a hold.
pub struct MomentumSignals {
    verdicts: HashMap<(String, DateTime<Utc>), Signal>,
}

impl MomentumSignals {
    pub fn from_series(series: &[SeriesData], params: &MomentumParams) -> Self {
        let mut verdicts = HashMap::new();

        for s in series {
            let closes = s.closes();
            let rsi_values = rsi(&closes, params.rsi_period);
            let macd_values = macd(
                &closes,
                params.macd_fast,
                params.macd_slow,
                params.macd_signal,
            );

            let mut emitted = 0usize;
            for i in 1..s.len() {
                let (Some(r), Some(m), Some(prev)) =
                    (rsi_values[i], macd_values[i], macd_values[i - 1])
                else {
                    continue;
                };

                let crossed_up = m.line > m.signal && prev.line <= prev.signal;
                let crossed_down = m.line < m.signal && prev.line >= prev.signal;

                let verdict = if r < params.oversold && crossed_up {
                    Signal::Buy
                } else if r > params.overbought && crossed_down {
                    Signal::Sell
                } else {
                    continue;
                };
                verdicts.insert((s.symbol().to_string(), s.klines()[i].open_time), verdict);
                emitted += 1;
            }
            debug!(symbol = s.symbol(), signals = emitted, "momentum signals computed");
        }

        MomentumSignals { verdicts }
    }
}

impl SignalSource for MomentumSignals {
    fn signal(&self, symbol: &str, timestamp: DateTime<Utc>) -> Signal {
        self.verdicts
            .get(&(symbol.to_string(), timestamp))
            .copied()
            .unwrap_or(Signal::Hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kline::Kline;
    use chrono::TimeZone;

    fn series_from(closes: &[f64]) -> SeriesData {
        let klines = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Kline {
                symbol: "BTCUSDC".into(),
                open_time: Utc
                    .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                    .unwrap()
                    + chrono::Duration::hours(i as i64),
                open: None,
                high: None,
                low: None,
                close: c,
                volume: None,
            })
            .collect();
        SeriesData::new("BTCUSDC".into(), klines)
    }

    #[test]
    fn warmup_bars_hold() {
        let s = series_from(&(0..20).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let signals = MomentumSignals::from_series(
            std::slice::from_ref(&s),
            &MomentumParams::default(),
        );
        for k in s.klines() {
            assert_eq!(signals.signal("BTCUSDC", k.open_time), Signal::Hold);
        }
    }

    #[test]
    fn unknown_symbol_holds() {
        let s = series_from(&[100.0; 60]);
        let signals = MomentumSignals::from_series(
            std::slice::from_ref(&s),
            &MomentumParams::default(),
        );
        assert_eq!(
            signals.signal("ETHUSDC", s.klines()[50].open_time),
            Signal::Hold
        );
    }

    #[test]
    fn verdicts_match_indicator_conditions() {
        // Decline into a V-shaped rebound: produces oversold RSI bars
        // and MACD crosses. Every bar's verdict must agree with the
        // indicator conditions recomputed independently.
        let closes: Vec<f64> = (0..120)
            .map(|i| {
                if i < 60 {
                    300.0 - i as f64 * 3.0
                } else {
                    120.0 + (i - 60) as f64 * 3.0
                }
            })
            .collect();

        let s = series_from(&closes);
        let params = MomentumParams::default();
        let signals = MomentumSignals::from_series(std::slice::from_ref(&s), &params);

        let rsi_values = crate::domain::indicator::rsi(&closes, params.rsi_period);
        let macd_values = crate::domain::indicator::macd(
            &closes,
            params.macd_fast,
            params.macd_slow,
            params.macd_signal,
        );

        let mut buys = 0;
        for i in 1..s.len() {
            let expected = match (rsi_values[i], macd_values[i], macd_values[i - 1]) {
                (Some(r), Some(m), Some(prev)) => {
                    if r < params.oversold && m.line > m.signal && prev.line <= prev.signal {
                        Signal::Buy
                    } else if r > params.overbought && m.line < m.signal && prev.line >= prev.signal
                    {
                        Signal::Sell
                    } else {
                        Signal::Hold
                    }
                }
                _ => Signal::Hold,
            };
            let actual = signals.signal("BTCUSDC", s.klines()[i].open_time);
            assert_eq!(actual, expected, "bar {}", i);
            if actual == Signal::Buy {
                buys += 1;
            }
        }
        // the rebound leg must produce at least one oversold cross-up
        assert!(buys > 0, "expected a buy somewhere on the rebound");
    }

    #[test]
    fn flat_series_never_signals() {
        let s = series_from(&[100.0; 80]);
        let signals = MomentumSignals::from_series(
            std::slice::from_ref(&s),
            &MomentumParams::default(),
        );
        for k in s.klines() {
            assert_eq!(signals.signal("BTCUSDC", k.open_time), Signal::Hold);
        }
    }
}
