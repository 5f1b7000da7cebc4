//! Append-only record of capital-affecting events.
//!
//! The log is write-once during a replay and read back only by the
//! metrics calculator and report writers after the replay completes.
//! Field names and serialized forms are the external compatibility
//! contract for persisted trade history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::position::Side;

/// What kind of capital-affecting event a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeKind {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
    ForceLong,
    ForceShort,
}

impl TradeKind {
    pub fn open(side: Side) -> Self {
        match side {
            Side::Long => TradeKind::OpenLong,
            Side::Short => TradeKind::OpenShort,
        }
    }

    pub fn close(side: Side) -> Self {
        match side {
            Side::Long => TradeKind::CloseLong,
            Side::Short => TradeKind::CloseShort,
        }
    }

    pub fn force(side: Side) -> Self {
        match side {
            Side::Long => TradeKind::ForceLong,
            Side::Short => TradeKind::ForceShort,
        }
    }

    /// True for the three close kinds, rule-triggered or forced.
    pub fn is_close(self) -> bool {
        matches!(
            self,
            TradeKind::CloseLong
                | TradeKind::CloseShort
                | TradeKind::ForceLong
                | TradeKind::ForceShort
        )
    }

    pub fn side(self) -> Side {
        match self {
            TradeKind::OpenLong | TradeKind::CloseLong | TradeKind::ForceLong => Side::Long,
            TradeKind::OpenShort | TradeKind::CloseShort | TradeKind::ForceShort => Side::Short,
        }
    }
}

/// Which exit rule triggered a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseReason {
    OppositeSignal,
    TakeProfit,
    TrailingStop,
    TimeExit,
    VolatilityStop,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::OppositeSignal => "OPPOSITE_SIGNAL",
            CloseReason::TakeProfit => "TAKE_PROFIT",
            CloseReason::TrailingStop => "TRAILING_STOP",
            CloseReason::TimeExit => "TIME_EXIT",
            CloseReason::VolatilityStop => "VOLATILITY_STOP",
        };
        write!(f, "{}", s)
    }
}

/// One immutable entry in the trade log.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub kind: TradeKind,
    pub price: f64,
    pub qty: f64,
    /// Cash-flow delta applied to the balance by this event (negative for
    /// opens, the balance credit for closes).
    pub usd_flow: f64,
    /// Free balance immediately after the event.
    pub balance: f64,
    /// Realized profit; present only on close records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
    /// Triggering exit rule; present only on rule-triggered closes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<CloseReason>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TradeLog {
    records: Vec<TradeRecord>,
}

impl TradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TradeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that realized a profit or loss, in log order.
    pub fn closes(&self) -> impl Iterator<Item = &TradeRecord> {
        self.records.iter().filter(|r| r.kind.is_close())
    }

    /// Final balance reconstructed purely from the recorded cash flows.
    ///
    /// Must agree exactly with the ledger balance after any sequence of
    /// opens and closes.
    pub fn replay_balance(&self, initial: f64) -> f64 {
        self.records.iter().fold(initial, |b, r| b + r.usd_flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap()
    }

    fn open_record(symbol: &str, balance: f64) -> TradeRecord {
        TradeRecord {
            timestamp: ts(0),
            symbol: symbol.into(),
            kind: TradeKind::OpenLong,
            price: 10.0,
            qty: 1.0,
            usd_flow: -10.0,
            balance,
            profit: None,
            reason: None,
        }
    }

    fn close_record(symbol: &str, profit: f64, balance: f64) -> TradeRecord {
        TradeRecord {
            timestamp: ts(1),
            symbol: symbol.into(),
            kind: TradeKind::CloseLong,
            price: 11.0,
            qty: 1.0,
            usd_flow: 10.0 + profit,
            balance,
            profit: Some(profit),
            reason: Some(CloseReason::OppositeSignal),
        }
    }

    #[test]
    fn kind_classification() {
        assert!(!TradeKind::OpenLong.is_close());
        assert!(!TradeKind::OpenShort.is_close());
        assert!(TradeKind::CloseLong.is_close());
        assert!(TradeKind::CloseShort.is_close());
        assert!(TradeKind::ForceLong.is_close());
        assert!(TradeKind::ForceShort.is_close());
    }

    #[test]
    fn kind_side() {
        assert_eq!(TradeKind::OpenShort.side(), Side::Short);
        assert_eq!(TradeKind::ForceLong.side(), Side::Long);
        assert_eq!(TradeKind::close(Side::Short), TradeKind::CloseShort);
        assert_eq!(TradeKind::force(Side::Short), TradeKind::ForceShort);
    }

    #[test]
    fn closes_filters_opens_out() {
        let mut log = TradeLog::new();
        log.push(open_record("BTCUSDC", 90.0));
        log.push(close_record("BTCUSDC", 1.0, 101.0));
        log.push(open_record("ETHUSDC", 91.0));

        let closes: Vec<_> = log.closes().collect();
        assert_eq!(closes.len(), 1);
        assert_eq!(closes[0].kind, TradeKind::CloseLong);
    }

    #[test]
    fn replay_balance_reconstructs_from_flows() {
        let mut log = TradeLog::new();
        log.push(open_record("BTCUSDC", 90.0));
        log.push(close_record("BTCUSDC", 1.0, 101.0));

        assert!((log.replay_balance(100.0) - 101.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serialized_record_uses_contract_names() {
        let json = serde_json::to_value(close_record("BTCUSDC", 1.0, 101.0)).unwrap();
        assert_eq!(json["kind"], "CLOSE_LONG");
        assert_eq!(json["reason"], "OPPOSITE_SIGNAL");
        assert_eq!(json["symbol"], "BTCUSDC");
        assert!(json.get("usd_flow").is_some());
    }

    #[test]
    fn serialized_open_omits_profit_and_reason() {
        let json = serde_json::to_value(open_record("BTCUSDC", 90.0)).unwrap();
        assert!(json.get("profit").is_none());
        assert!(json.get("reason").is_none());
    }
}
