//! Per-instrument bar series and the unified multi-instrument timeline.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

use super::kline::Kline;

/// Bars for one instrument, indexed both by position and by timestamp.
///
/// Bars are assumed sorted ascending by `open_time` with no duplicate
/// timestamps; the adapters enforce this on load.
#[derive(Debug, Clone)]
pub struct SeriesData {
    symbol: String,
    klines: Vec<Kline>,
    time_index: HashMap<DateTime<Utc>, usize>,
}

impl SeriesData {
    pub fn new(symbol: String, klines: Vec<Kline>) -> Self {
        let time_index = klines
            .iter()
            .enumerate()
            .map(|(i, k)| (k.open_time, i))
            .collect();
        SeriesData {
            symbol,
            klines,
            time_index,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn klines(&self) -> &[Kline] {
        &self.klines
    }

    pub fn len(&self) -> usize {
        self.klines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.klines.is_empty()
    }

    /// Position of the bar at exactly `timestamp`, if the instrument
    /// traded then.
    pub fn index_at(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        self.time_index.get(&timestamp).copied()
    }

    pub fn kline_at(&self, timestamp: DateTime<Utc>) -> Option<&Kline> {
        self.index_at(timestamp).map(|i| &self.klines[i])
    }

    pub fn last_kline(&self) -> Option<&Kline> {
        self.klines.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.klines.iter().map(|k| k.close).collect()
    }
}

/// Sorted union of every series' timestamps.
///
/// Instruments with disjoint histories interleave; a timestamp present
/// in several series appears once.
pub fn build_unified_timeline(series: &[SeriesData]) -> Vec<DateTime<Utc>> {
    let mut timestamps = BTreeSet::new();
    for s in series {
        for k in s.klines() {
            timestamps.insert(k.open_time);
        }
    }
    timestamps.into_iter().collect()
}
