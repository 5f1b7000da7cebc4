//! Trading signal verdicts.

use std::fmt;

/// Verdict of a signal source for one instrument at one timestamp.
///
/// `Hold` means no action: neither an entry nor an opposite-signal exit
/// is triggered by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// True for `Buy` and `Sell`, the verdicts that can open a position.
    pub fn is_entry(self) -> bool {
        matches!(self, Signal::Buy | Signal::Sell)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}
