//! Daily OHLCV bar representation.

use chrono::NaiveDate;

/// One price record for a symbol on a trading date. Immutable; the bar
/// source guarantees at most one per (symbol, date).
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// close > open
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// (close - open) / open
    pub fn body_return(&self) -> f64 {
        if self.open > 0.0 {
            (self.close - self.open) / self.open
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            symbol: "ACME".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 95.0,
            close: 105.0,
            volume: 50_000,
        }
    }

    #[test]
    fn bullish_when_close_above_open() {
        let bar = sample_bar();
        assert!(bar.is_bullish());
    }

    #[test]
    fn not_bullish_when_close_below_open() {
        let mut bar = sample_bar();
        bar.close = 99.0;
        assert!(!bar.is_bullish());
    }

    #[test]
    fn not_bullish_on_doji() {
        let mut bar = sample_bar();
        bar.close = bar.open;
        assert!(!bar.is_bullish());
    }

    #[test]
    fn body_return_positive() {
        let bar = sample_bar();
        assert!((bar.body_return() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn body_return_zero_open() {
        let mut bar = sample_bar();
        bar.open = 0.0;
        assert!((bar.body_return() - 0.0).abs() < f64::EPSILON);
    }
}
