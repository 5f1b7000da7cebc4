//! CSV file kline adapter.
//!
//! Reads one file per instrument named `{symbol}.csv` with the columns
//! `timestamp_ms,open,high,low,close,volume`. Timestamps are Unix epoch
//! milliseconds; open, high, low and volume may be empty.

use crate::domain::error::TidesimError;
use crate::domain::kline::Kline;
use crate::ports::data_port::DataPort;
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CsvKlineAdapter {
    base_path: PathBuf,
}

impl CsvKlineAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn data_err(symbol: &str, reason: String) -> TidesimError {
    TidesimError::Data {
        symbol: symbol.to_string(),
        reason,
    }
}

fn parse_optional(field: Option<&str>) -> Result<Option<f64>, std::num::ParseFloatError> {
    match field {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse().map(Some),
    }
}

impl DataPort for CsvKlineAdapter {
    fn fetch_klines(&self, symbol: &str) -> Result<Vec<Kline>, TidesimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_err(symbol, format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut klines = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| data_err(symbol, format!("CSV parse error: {}", e)))?;

            let ms: i64 = record
                .get(0)
                .ok_or_else(|| data_err(symbol, "missing timestamp column".into()))?
                .trim()
                .parse()
                .map_err(|e| data_err(symbol, format!("invalid timestamp value: {}", e)))?;
            let open_time = Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| data_err(symbol, format!("timestamp out of range: {}", ms)))?;

            let open = parse_optional(record.get(1))
                .map_err(|e| data_err(symbol, format!("invalid open value: {}", e)))?;
            let high = parse_optional(record.get(2))
                .map_err(|e| data_err(symbol, format!("invalid high value: {}", e)))?;
            let low = parse_optional(record.get(3))
                .map_err(|e| data_err(symbol, format!("invalid low value: {}", e)))?;

            let close: f64 = record
                .get(4)
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| data_err(symbol, "missing close column".into()))?
                .trim()
                .parse()
                .map_err(|e| data_err(symbol, format!("invalid close value: {}", e)))?;

            let volume = parse_optional(record.get(5))
                .map_err(|e| data_err(symbol, format!("invalid volume value: {}", e)))?;

            klines.push(Kline {
                symbol: symbol.to_string(),
                open_time,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        klines.sort_by_key(|k| k.open_time);
        klines.dedup_by_key(|k| k.open_time);
        Ok(klines)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TidesimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TidesimError::Data {
            symbol: String::new(),
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TidesimError::Data {
                symbol: String::new(),
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
