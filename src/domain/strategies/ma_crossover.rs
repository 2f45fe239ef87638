//! Moving-average crossover strategy.
//!
//! Buy when the short SMA crosses above the long SMA, sell when it
//! crosses back below. Signals fire only on the crossing bar, not while
//! a trend persists.

use std::collections::BTreeMap;

use crate::domain::bar::Bar;
use crate::domain::error::{QuantsimError, StrategyError};
use crate::domain::strategy::{parse_usize_param, Signal, Strategy};

const DEFAULT_SHORT_WINDOW: usize = 5;
const DEFAULT_LONG_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Bullish,
    Bearish,
}

#[derive(Debug)]
pub struct MaCrossover {
    short_window: usize,
    long_window: usize,
    history: BTreeMap<String, Vec<f64>>,
    last_trend: BTreeMap<String, Trend>,
}

impl MaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, QuantsimError> {
        if short_window == 0 || long_window == 0 || short_window >= long_window {
            return Err(QuantsimError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "short_window".to_string(),
                reason: format!(
                    "windows must satisfy 0 < short < long, got short={}, long={}",
                    short_window, long_window
                ),
            });
        }
        Ok(MaCrossover {
            short_window,
            long_window,
            history: BTreeMap::new(),
            last_trend: BTreeMap::new(),
        })
    }

    pub fn from_params(params: &BTreeMap<String, String>) -> Result<Self, QuantsimError> {
        let short = parse_usize_param(params, "short_window", DEFAULT_SHORT_WINDOW)?;
        let long = parse_usize_param(params, "long_window", DEFAULT_LONG_WINDOW)?;
        Self::new(short, long)
    }

    fn sma(prices: &[f64], window: usize) -> f64 {
        let tail = &prices[prices.len() - window..];
        tail.iter().sum::<f64>() / window as f64
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn initialize(&mut self) -> Result<(), StrategyError> {
        self.history.clear();
        self.last_trend.clear();
        Ok(())
    }

    fn on_bar(&mut self, symbol: &str, bar: &Bar) -> Result<Signal, StrategyError> {
        let prices = self.history.entry(symbol.to_string()).or_default();
        prices.push(bar.close);

        // Cap retained history; only the trailing long window matters.
        let cap = self.long_window * 2;
        if prices.len() > cap {
            prices.drain(..prices.len() - cap);
        }

        if prices.len() < self.long_window {
            return Ok(Signal::Hold);
        }

        let short_ma = Self::sma(prices, self.short_window);
        let long_ma = Self::sma(prices, self.long_window);

        let trend = if short_ma > long_ma {
            Trend::Bullish
        } else if short_ma < long_ma {
            Trend::Bearish
        } else {
            return Ok(Signal::Hold);
        };

        let previous = self.last_trend.insert(symbol.to_string(), trend);
        match (previous, trend) {
            (Some(Trend::Bullish), Trend::Bullish) | (Some(Trend::Bearish), Trend::Bearish) => {
                Ok(Signal::Hold)
            }
            (_, Trend::Bullish) => Ok(Signal::Buy),
            (Some(_), Trend::Bearish) => Ok(Signal::Sell),
            // First observed trend is bearish: nothing to exit.
            (None, Trend::Bearish) => Ok(Signal::Hold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(symbol: &str, day: u32, close: f64) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    fn feed(strategy: &mut MaCrossover, symbol: &str, closes: &[f64]) -> Vec<Signal> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| strategy.on_bar(symbol, &make_bar(symbol, i as u32, c)).unwrap())
            .collect()
    }

    #[test]
    fn rejects_degenerate_windows() {
        assert!(MaCrossover::new(0, 20).is_err());
        assert!(MaCrossover::new(5, 5).is_err());
        assert!(MaCrossover::new(20, 5).is_err());
        assert!(MaCrossover::new(5, 20).is_ok());
    }

    #[test]
    fn holds_until_long_window_filled() {
        let mut strategy = MaCrossover::new(2, 4).unwrap();
        let signals = feed(&mut strategy, "ACME", &[10.0, 10.0, 10.0]);
        assert_eq!(signals, vec![Signal::Hold, Signal::Hold, Signal::Hold]);
    }

    #[test]
    fn buys_on_golden_cross_once() {
        let mut strategy = MaCrossover::new(2, 4).unwrap();
        // Flat then rising: short MA overtakes long MA and stays above.
        let signals = feed(&mut strategy, "ACME", &[10.0, 10.0, 10.0, 10.0, 12.0, 14.0, 16.0]);

        let buys: Vec<_> = signals.iter().filter(|s| **s == Signal::Buy).collect();
        assert_eq!(buys.len(), 1);
        assert_eq!(signals[4], Signal::Buy);
        assert_eq!(signals[5], Signal::Hold);
    }

    #[test]
    fn sells_on_death_cross_after_buy() {
        let mut strategy = MaCrossover::new(2, 4).unwrap();
        let signals = feed(
            &mut strategy,
            "ACME",
            &[10.0, 10.0, 10.0, 10.0, 14.0, 16.0, 12.0, 8.0, 6.0],
        );

        assert_eq!(signals[4], Signal::Buy);
        assert!(signals[6..].contains(&Signal::Sell));
    }

    #[test]
    fn initial_bearish_trend_does_not_sell() {
        let mut strategy = MaCrossover::new(2, 4).unwrap();
        let signals = feed(&mut strategy, "ACME", &[20.0, 18.0, 16.0, 14.0, 12.0]);
        assert!(!signals.contains(&Signal::Sell));
        assert!(!signals.contains(&Signal::Buy));
    }

    #[test]
    fn symbols_are_tracked_independently() {
        let mut strategy = MaCrossover::new(2, 4).unwrap();
        feed(&mut strategy, "ACME", &[10.0, 10.0, 10.0, 10.0, 14.0]);
        // ZETA has seen no bars; a single bar must not signal.
        let signal = strategy.on_bar("ZETA", &make_bar("ZETA", 0, 50.0)).unwrap();
        assert_eq!(signal, Signal::Hold);
    }

    #[test]
    fn initialize_resets_state() {
        let mut strategy = MaCrossover::new(2, 4).unwrap();
        feed(&mut strategy, "ACME", &[10.0, 10.0, 10.0, 10.0, 14.0]);
        strategy.initialize().unwrap();
        let signals = feed(&mut strategy, "ACME", &[10.0, 10.0, 10.0]);
        assert_eq!(signals, vec![Signal::Hold, Signal::Hold, Signal::Hold]);
    }
}
