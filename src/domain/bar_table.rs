//! In-memory bar table: per-symbol series with O(1) (symbol, date) lookup
//! and the unified trading-date timeline.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::bar::Bar;

/// Ordered bar series for one symbol, indexed by date.
#[derive(Debug, Clone)]
pub struct SymbolSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl SymbolSeries {
    pub fn new(symbol: String, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        Self {
            symbol,
            bars,
            date_index,
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn get_bar(&self, date: NaiveDate) -> Option<&Bar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }
}

/// Read-only table of pre-loaded bars across the whole universe.
///
/// Symbols are kept in a `BTreeMap` so every iteration is in ascending
/// lexicographic order, which the engine relies on for deterministic
/// trade ordering under shared buying power.
#[derive(Debug, Clone, Default)]
pub struct BarTable {
    series: BTreeMap<String, SymbolSeries>,
}

impl BarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a flat bar list by symbol.
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        let mut grouped: BTreeMap<String, Vec<Bar>> = BTreeMap::new();
        for bar in bars {
            grouped.entry(bar.symbol.clone()).or_default().push(bar);
        }
        let series = grouped
            .into_iter()
            .map(|(symbol, bars)| (symbol.clone(), SymbolSeries::new(symbol, bars)))
            .collect();
        Self { series }
    }

    pub fn insert_series(&mut self, series: SymbolSeries) {
        self.series.insert(series.symbol.clone(), series);
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn symbol_count(&self) -> usize {
        self.series.len()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn get_bar(&self, symbol: &str, date: NaiveDate) -> Option<&Bar> {
        self.series.get(symbol).and_then(|s| s.get_bar(date))
    }

    /// Symbols with a bar on `date`, in ascending lexicographic order.
    pub fn symbols_on(&self, date: NaiveDate) -> Vec<&str> {
        self.series
            .values()
            .filter(|s| s.get_bar(date).is_some())
            .map(|s| s.symbol.as_str())
            .collect()
    }

    /// Sorted union of all dates present in the table, restricted to
    /// the inclusive `[start, end]` range.
    pub fn trading_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let unique: BTreeSet<NaiveDate> = self
            .series
            .values()
            .flat_map(|s| s.bars.iter().map(|b| b.date))
            .filter(|d| *d >= start && *d <= end)
            .collect();
        unique.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bar(symbol: &str, date: &str, close: f64) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn series_sorts_bars_and_builds_index() {
        let series = SymbolSeries::new(
            "ACME".into(),
            vec![
                make_bar("ACME", "2024-01-03", 102.0),
                make_bar("ACME", "2024-01-01", 100.0),
                make_bar("ACME", "2024-01-02", 101.0),
            ],
        );

        assert_eq!(series.bar_count(), 3);
        assert_eq!(series.bars[0].date, date(2024, 1, 1));
        assert_eq!(series.bars[2].date, date(2024, 1, 3));
        let bar = series.get_bar(date(2024, 1, 2)).unwrap();
        assert!((bar.close - 101.0).abs() < f64::EPSILON);
        assert!(series.get_bar(date(2024, 1, 5)).is_none());
    }

    #[test]
    fn from_bars_groups_by_symbol() {
        let table = BarTable::from_bars(vec![
            make_bar("ZETA", "2024-01-01", 50.0),
            make_bar("ACME", "2024-01-01", 100.0),
            make_bar("ACME", "2024-01-02", 101.0),
        ]);

        assert_eq!(table.symbol_count(), 2);
        assert!(table.get_bar("ACME", date(2024, 1, 2)).is_some());
        assert!(table.get_bar("ZETA", date(2024, 1, 2)).is_none());
    }

    #[test]
    fn symbols_on_is_lexicographic() {
        let table = BarTable::from_bars(vec![
            make_bar("ZETA", "2024-01-01", 50.0),
            make_bar("ACME", "2024-01-01", 100.0),
            make_bar("MIDD", "2024-01-01", 75.0),
            make_bar("ZETA", "2024-01-02", 51.0),
        ]);

        assert_eq!(table.symbols_on(date(2024, 1, 1)), vec!["ACME", "MIDD", "ZETA"]);
        assert_eq!(table.symbols_on(date(2024, 1, 2)), vec!["ZETA"]);
        assert!(table.symbols_on(date(2024, 1, 3)).is_empty());
    }

    #[test]
    fn trading_dates_merges_and_restricts() {
        let table = BarTable::from_bars(vec![
            make_bar("ACME", "2024-01-02", 100.0),
            make_bar("ACME", "2024-01-05", 101.0),
            make_bar("ZETA", "2024-01-01", 50.0),
            make_bar("ZETA", "2024-01-03", 51.0),
        ]);

        let dates = table.trading_dates(date(2024, 1, 2), date(2024, 1, 5));
        assert_eq!(dates, vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 5)]);
    }

    #[test]
    fn trading_dates_empty_table() {
        let table = BarTable::new();
        assert!(table.trading_dates(date(2024, 1, 1), date(2024, 12, 31)).is_empty());
        assert!(table.is_empty());
    }
}
