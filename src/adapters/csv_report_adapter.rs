//! CSV report adapter: persists one run as a directory of CSV files.
//!
//! `trades.csv`, `equity.csv`, and single-row `summary.csv`, plus
//! `rejections.csv` when any trade was refused.

use std::fs;
use std::path::Path;

use crate::domain::engine::BacktestResult;
use crate::domain::error::QuantsimError;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct CsvReportWriter;

impl CsvReportWriter {
    pub fn new() -> Self {
        Self
    }
}

fn csv_error(path: &Path, e: csv::Error) -> QuantsimError {
    QuantsimError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

impl ReportPort for CsvReportWriter {
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), QuantsimError> {
        fs::create_dir_all(output_dir)?;

        let trades_path = output_dir.join("trades.csv");
        let mut writer =
            csv::Writer::from_path(&trades_path).map_err(|e| csv_error(&trades_path, e))?;
        for trade in &result.trades {
            writer
                .serialize(trade)
                .map_err(|e| csv_error(&trades_path, e))?;
        }
        writer.flush()?;

        let equity_path = output_dir.join("equity.csv");
        let mut writer =
            csv::Writer::from_path(&equity_path).map_err(|e| csv_error(&equity_path, e))?;
        for point in &result.equity_curve {
            writer
                .serialize(point)
                .map_err(|e| csv_error(&equity_path, e))?;
        }
        writer.flush()?;

        let summary_path = output_dir.join("summary.csv");
        let mut writer =
            csv::Writer::from_path(&summary_path).map_err(|e| csv_error(&summary_path, e))?;
        writer
            .serialize(&result.summary)
            .map_err(|e| csv_error(&summary_path, e))?;
        writer.flush()?;

        if !result.rejections.is_empty() {
            let rejections_path = output_dir.join("rejections.csv");
            let mut writer = csv::Writer::from_path(&rejections_path)
                .map_err(|e| csv_error(&rejections_path, e))?;
            writer
                .write_record(["symbol", "date", "side", "reason"])
                .map_err(|e| csv_error(&rejections_path, e))?;
            for rejection in &result.rejections {
                writer
                    .write_record([
                        rejection.symbol.as_str(),
                        &rejection.date.to_string(),
                        &rejection.side.to_string(),
                        &rejection.reason.to_string(),
                    ])
                    .map_err(|e| csv_error(&rejections_path, e))?;
            }
            writer.flush()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::{EquityPoint, RejectReason, RejectedTrade, Side, TradeRecord};
    use crate::domain::metrics::Summary;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn sample_result(with_rejection: bool) -> BacktestResult {
        let trades = vec![TradeRecord {
            symbol: "ACME".to_string(),
            date: date(),
            side: Side::Buy,
            price: 100.0,
            quantity: 50,
            cash_after: 5000.0,
        }];
        let equity_curve = vec![EquityPoint {
            date: date(),
            cash: 5000.0,
            market_value: 5000.0,
            total_value: 10_000.0,
        }];
        let rejections = if with_rejection {
            vec![RejectedTrade {
                symbol: "ZETA".to_string(),
                date: date(),
                side: Side::Buy,
                reason: RejectReason::ZeroQuantity,
            }]
        } else {
            Vec::new()
        };
        let summary = Summary::compute(&trades, &equity_curve, 10_000.0);
        BacktestResult {
            strategy_name: "scripted".to_string(),
            initial_cash: 10_000.0,
            trades,
            rejections,
            equity_curve,
            summary,
        }
    }

    #[test]
    fn writes_all_report_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report");
        CsvReportWriter::new()
            .write(&sample_result(true), &out)
            .unwrap();

        let trades = fs::read_to_string(out.join("trades.csv")).unwrap();
        assert!(trades.contains("symbol,date,side,price,quantity,cash_after"));
        assert!(trades.contains("ACME,2024-01-15,BUY,100.0,50,5000.0"));

        let equity = fs::read_to_string(out.join("equity.csv")).unwrap();
        assert!(equity.contains("date,cash,market_value,total_value"));
        assert!(equity.contains("2024-01-15,5000.0,5000.0,10000.0"));

        let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
        assert!(summary.starts_with("total_return,"));
        assert_eq!(summary.lines().count(), 2);

        let rejections = fs::read_to_string(out.join("rejections.csv")).unwrap();
        assert!(rejections.contains("ZETA"));
        assert!(rejections.contains("zero quantity"));
    }

    #[test]
    fn skips_rejections_file_when_empty() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report");
        CsvReportWriter::new()
            .write(&sample_result(false), &out)
            .unwrap();

        assert!(out.join("trades.csv").exists());
        assert!(!out.join("rejections.csv").exists());
    }
}
