//! CSV file data adapter.
//!
//! One file per symbol at `<base_dir>/<SYMBOL>.csv` with the header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::bar::Bar;
use crate::domain::error::QuantsimError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub struct CsvBarSource {
    base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

impl CsvBarSource {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_dir.join(format!("{}.csv", symbol))
    }
}

impl DataPort for CsvBarSource {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, QuantsimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| QuantsimError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.deserialize::<CsvRow>() {
            let row = result.map_err(|e| QuantsimError::Data {
                reason: format!("{}: {}", path.display(), e),
            })?;

            if row.date < start_date || row.date > end_date {
                continue;
            }

            bars.push(Bar {
                symbol: symbol.to_string(),
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantsimError> {
        let entries = fs::read_dir(&self.base_dir).map_err(|e| QuantsimError::Data {
            reason: format!("failed to read directory {}: {}", self.base_dir.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| QuantsimError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
