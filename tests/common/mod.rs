#![allow(dead_code)]

use chrono::NaiveDate;
use quantsim::domain::bar::Bar;
use quantsim::domain::config::BacktestConfig;
use quantsim::domain::error::{QuantsimError, StrategyError};
use quantsim::domain::strategy::{Signal, Strategy};
use quantsim::ports::data_port::DataPort;
use std::collections::{BTreeMap, HashMap};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(symbol: &str, date_str: &str, close: f64) -> Bar {
    Bar {
        symbol: symbol.to_string(),
        date: date(date_str),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

pub fn sample_config(start: &str, end: &str) -> BacktestConfig {
    BacktestConfig {
        start_date: date(start),
        end_date: date(end),
        initial_cash: 10_000.0,
        max_position_pct: 1.0,
        max_open_positions: 1,
        params: BTreeMap::new(),
    }
}

/// Replays a fixed per-(symbol, date) signal script, holding otherwise.
#[derive(Debug)]
pub struct ScriptedStrategy {
    signals: BTreeMap<(String, NaiveDate), Signal>,
}

impl ScriptedStrategy {
    pub fn new(entries: &[(&str, &str, Signal)]) -> Self {
        let signals = entries
            .iter()
            .map(|&(sym, d, sig)| ((sym.to_string(), date(d)), sig))
            .collect();
        Self { signals }
    }
}

impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn initialize(&mut self) -> Result<(), StrategyError> {
        Ok(())
    }

    fn on_bar(&mut self, symbol: &str, bar: &Bar) -> Result<Signal, StrategyError> {
        Ok(self
            .signals
            .get(&(symbol.to_string(), bar.date))
            .copied()
            .unwrap_or(Signal::Hold))
    }
}

/// Errors after a fixed number of successful `on_bar` calls.
#[derive(Debug)]
pub struct FailingStrategy {
    pub calls_before_failure: usize,
    calls: usize,
}

impl FailingStrategy {
    pub fn new(calls_before_failure: usize) -> Self {
        Self {
            calls_before_failure,
            calls: 0,
        }
    }
}

impl Strategy for FailingStrategy {
    fn name(&self) -> &str {
        "failing"
    }

    fn initialize(&mut self) -> Result<(), StrategyError> {
        self.calls = 0;
        Ok(())
    }

    fn on_bar(&mut self, _symbol: &str, _bar: &Bar) -> Result<Signal, StrategyError> {
        if self.calls >= self.calls_before_failure {
            return Err(StrategyError::new("simulated strategy failure"));
        }
        self.calls += 1;
        Ok(Signal::Hold)
    }
}

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, QuantsimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(QuantsimError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantsimError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}
