//! Signal source port trait.

use chrono::{DateTime, Utc};

use crate::domain::signal::Signal;

/// Verdict provider consulted by the replay engine at each bar.
///
/// Implementations must be pure with respect to the replay: the same
/// (symbol, timestamp) query always returns the same verdict.
pub trait SignalSource {
    fn signal(&self, symbol: &str, timestamp: DateTime<Utc>) -> Signal;
}
