#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

use tidesim::domain::error::TidesimError;
pub use tidesim::domain::kline::Kline;
use tidesim::domain::replay::ReplayConfig;
use tidesim::domain::series::SeriesData;
use tidesim::domain::signal::Signal;
use tidesim::ports::data_port::DataPort;
use tidesim::ports::signal_port::SignalSource;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Kline>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_klines(mut self, symbol: &str, klines: Vec<Kline>) -> Self {
        self.data.insert(symbol.to_string(), klines);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_klines(&self, symbol: &str) -> Result<Vec<Kline>, TidesimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TidesimError::Data {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TidesimError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Signal source scripted per (symbol, timestamp); everything else holds.
pub struct ScriptedSignals {
    verdicts: HashMap<(String, DateTime<Utc>), Signal>,
}

impl ScriptedSignals {
    pub fn new() -> Self {
        Self {
            verdicts: HashMap::new(),
        }
    }

    pub fn at(mut self, symbol: &str, timestamp: DateTime<Utc>, signal: Signal) -> Self {
        self.verdicts
            .insert((symbol.to_string(), timestamp), signal);
        self
    }
}

impl SignalSource for ScriptedSignals {
    fn signal(&self, symbol: &str, timestamp: DateTime<Utc>) -> Signal {
        self.verdicts
            .get(&(symbol.to_string(), timestamp))
            .copied()
            .unwrap_or(Signal::Hold)
    }
}

pub fn hour(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(h as i64)
}

pub fn make_kline(symbol: &str, h: u32, close: f64) -> Kline {
    Kline {
        symbol: symbol.to_string(),
        open_time: hour(h),
        open: Some(close),
        high: Some(close * 1.01),
        low: Some(close * 0.99),
        close,
        volume: Some(1000.0),
    }
}

pub fn make_series(symbol: &str, bars: &[(u32, f64)]) -> SeriesData {
    let klines = bars
        .iter()
        .map(|&(h, c)| make_kline(symbol, h, c))
        .collect();
    SeriesData::new(symbol.to_string(), klines)
}

pub fn sample_config() -> ReplayConfig {
    ReplayConfig {
        initial_balance: 1000.0,
        risk_per_trade: 0.1,
        ..ReplayConfig::default()
    }
}
