//! Technical indicators over close-price series.
//!
//! Every function returns a vector aligned 1:1 with its input, with
//! `None` for warmup bars where the indicator is not yet defined.
//! Callers index these vectors by bar position, never by timestamp.

mod atr;
mod ema;
mod macd;
mod rsi;

pub use atr::atr;
pub use ema::ema;
pub use macd::{macd, MacdPoint, DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
pub use rsi::rsi;
