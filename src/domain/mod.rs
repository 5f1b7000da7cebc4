//! Domain logic: replay engine, positions, exits, signals and metrics.

pub mod config_validation;
pub mod error;
pub mod exit;
pub mod indicator;
pub mod kline;
pub mod ledger;
pub mod metrics;
pub mod momentum;
pub mod position;
pub mod replay;
pub mod series;
pub mod signal;
pub mod trade_log;
