//! Market data access port trait.

use crate::domain::error::TidesimError;
use crate::domain::kline::Kline;

pub trait DataPort {
    /// Fetch all bars for one instrument, sorted ascending by open time.
    fn fetch_klines(&self, symbol: &str) -> Result<Vec<Kline>, TidesimError>;

    /// Instruments the source can serve, in no particular order.
    fn list_symbols(&self) -> Result<Vec<String>, TidesimError>;
}
