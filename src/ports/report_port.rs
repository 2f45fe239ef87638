//! Report generation port trait.

use std::path::Path;

use crate::domain::engine::BacktestResult;
use crate::domain::error::QuantsimError;

/// Port for persisting a finished backtest.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), QuantsimError>;
}
