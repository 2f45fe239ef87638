//! The backtest loop: deterministic date-by-date simulation of one
//! strategy over a pre-loaded bar table.
//!
//! Ordering is fixed: dates ascend, symbols within a date ascend
//! lexicographically, and every collection the loop touches iterates in
//! that order. Two runs over the same inputs produce bit-identical
//! results.

use std::collections::BTreeMap;

use super::bar_table::BarTable;
use super::config::BacktestConfig;
use super::error::QuantsimError;
use super::ledger::{EquityPoint, Ledger, RejectedTrade, Side, TradeRecord};
use super::metrics::Summary;
use super::strategy::{Signal, SizingContext, Strategy};

/// Everything one run produced: the logs, the curve, and the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy_name: String,
    pub initial_cash: f64,
    pub trades: Vec<TradeRecord>,
    pub rejections: Vec<RejectedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub summary: Summary,
}

/// Run `strategy` over every trading date in the configured range.
///
/// Per date: symbols are visited in lexicographic order; each visit
/// updates the carried-forward close, feeds the bar to the strategy,
/// and executes the resulting signal at that bar's close. Buys are
/// skipped while the symbol is already held; sells always exit the full
/// position. After the last symbol the ledger is marked to market
/// exactly once. A range containing no bars yields an empty result, not
/// an error.
pub fn run_backtest(
    table: &BarTable,
    strategy: &mut dyn Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, QuantsimError> {
    config.validate()?;
    strategy.initialize()?;

    let mut ledger = Ledger::new(config.initial_cash);
    let mut last_close: BTreeMap<String, f64> = BTreeMap::new();

    for date in table.trading_dates(config.start_date, config.end_date) {
        for symbol in table.symbols_on(date) {
            let bar = match table.get_bar(symbol, date) {
                Some(bar) => bar,
                None => continue,
            };
            last_close.insert(symbol.to_string(), bar.close);

            let signal = strategy.on_bar(symbol, bar)?;
            match signal {
                Signal::Buy => {
                    if ledger.holds(symbol) {
                        continue;
                    }
                    let ctx = SizingContext {
                        available_cash: ledger.cash,
                        max_position_pct: config.max_position_pct,
                        max_open_positions: config.max_open_positions,
                        open_positions: ledger.open_position_count(),
                    };
                    let quantity = strategy.position_size(symbol, bar.close, &ctx)?;
                    if let Err(reason) =
                        ledger.apply_trade(symbol, Side::Buy, quantity, bar.close, date)
                    {
                        ledger.record_rejection(symbol, date, Side::Buy, reason);
                    }
                }
                Signal::Sell => {
                    let held = ledger.held_quantity(symbol);
                    if held == 0 {
                        continue;
                    }
                    if let Err(reason) =
                        ledger.apply_trade(symbol, Side::Sell, held, bar.close, date)
                    {
                        ledger.record_rejection(symbol, date, Side::Sell, reason);
                    }
                }
                Signal::Hold => {}
            }
        }
        ledger.mark_to_market(date, &last_close);
    }

    let summary = Summary::compute(&ledger.trades, &ledger.equity_curve, config.initial_cash);
    Ok(BacktestResult {
        strategy_name: strategy.name().to_string(),
        initial_cash: config.initial_cash,
        trades: ledger.trades,
        rejections: ledger.rejections,
        equity_curve: ledger.equity_curve,
        summary,
    })
}
