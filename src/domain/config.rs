//! Backtest configuration: loading from a [`ConfigPort`] and fail-fast
//! validation before any date is processed.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::error::QuantsimError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;
pub const DEFAULT_MAX_POSITION_PCT: f64 = 0.95;

/// Immutable parameters for one backtest run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_cash: f64,
    /// Fraction of available cash a single entry may consume, in (0, 1].
    pub max_position_pct: f64,
    /// Maximum number of concurrently held symbols.
    pub max_open_positions: usize,
    /// Strategy-specific parameters, passed through unexamined.
    pub params: BTreeMap<String, String>,
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), QuantsimError> {
        if self.initial_cash <= 0.0 {
            return Err(invalid("initial_cash", "initial_cash must be positive"));
        }
        if self.max_position_pct <= 0.0 || self.max_position_pct > 1.0 {
            return Err(invalid(
                "max_position_pct",
                "max_position_pct must be in (0, 1]",
            ));
        }
        if self.max_open_positions == 0 {
            return Err(invalid(
                "max_open_positions",
                "max_open_positions must be at least 1",
            ));
        }
        if self.start_date > self.end_date {
            return Err(invalid(
                "start_date",
                "start_date must not be after end_date",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> QuantsimError {
    QuantsimError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_date(value: Option<String>, key: &str) -> Result<NaiveDate, QuantsimError> {
    match value {
        None => Err(QuantsimError::ConfigMissing {
            section: "backtest".to_string(),
            key: key.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
            invalid(key, &format!("invalid {} format, expected YYYY-MM-DD", key))
        }),
    }
}

/// Build a validated [`BacktestConfig`] from the `[backtest]` section,
/// with strategy parameters collected from `[strategy]` (minus the
/// reserved `name` key).
pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, QuantsimError> {
    let start_date = parse_date(config.get_string("backtest", "start_date"), "start_date")?;
    let end_date = parse_date(config.get_string("backtest", "end_date"), "end_date")?;

    let mut params = config.get_section("strategy");
    params.remove("name");

    let built = BacktestConfig {
        start_date,
        end_date,
        initial_cash: config.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH),
        max_position_pct: config.get_double(
            "backtest",
            "max_position_pct",
            DEFAULT_MAX_POSITION_PCT,
        ),
        max_open_positions: config.get_int("backtest", "max_open_positions", 1).max(0) as usize,
        params,
    };
    built.validate()?;
    Ok(built)
}
