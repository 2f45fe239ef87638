//! "Red three soldiers" candlestick pattern strategy.
//!
//! Buy at the close of the third of three consecutive bullish candles
//! whose opens sit inside the prior candle's real body and whose closes
//! step upward. Exit unconditionally on the next bar after entry,
//! win or lose.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::bar::Bar;
use crate::domain::error::StrategyError;
use crate::domain::strategy::{Signal, Strategy};

const PATTERN_LEN: usize = 3;

#[derive(Debug, Default)]
pub struct RedThreeSoldiers {
    window: BTreeMap<String, Vec<Bar>>,
    pending_exit: BTreeSet<String>,
}

impl RedThreeSoldiers {
    pub fn new() -> Self {
        Self::default()
    }

    fn pattern_matches(bars: &[Bar]) -> bool {
        if bars.len() < PATTERN_LEN {
            return false;
        }
        for bar in bars {
            if !bar.is_bullish() {
                return false;
            }
        }
        for pair in bars.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            // Open inside the previous real body, close stepping up.
            if next.open <= prev.open || next.open >= prev.close {
                return false;
            }
            if next.close <= prev.close {
                return false;
            }
        }
        true
    }
}

impl Strategy for RedThreeSoldiers {
    fn name(&self) -> &str {
        "red_three_soldiers"
    }

    fn initialize(&mut self) -> Result<(), StrategyError> {
        self.window.clear();
        self.pending_exit.clear();
        Ok(())
    }

    fn on_bar(&mut self, symbol: &str, bar: &Bar) -> Result<Signal, StrategyError> {
        // An entry signalled on the previous bar exits here regardless
        // of what today's candle looks like.
        if self.pending_exit.remove(symbol) {
            let window = self.window.entry(symbol.to_string()).or_default();
            window.push(bar.clone());
            if window.len() > PATTERN_LEN {
                window.remove(0);
            }
            return Ok(Signal::Sell);
        }

        let window = self.window.entry(symbol.to_string()).or_default();
        window.push(bar.clone());
        if window.len() > PATTERN_LEN {
            window.remove(0);
        }

        if Self::pattern_matches(window) {
            self.pending_exit.insert(symbol.to_string());
            return Ok(Signal::Buy);
        }
        Ok(Signal::Hold)
    }
}
