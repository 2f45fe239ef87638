//! Performance summary computed from the trade log and equity curve.
//!
//! Pure over its inputs: recomputing from the same `(trades, equity
//! curve, initial cash)` always yields identical values. Volatility and
//! Sharpe use the *sample* standard deviation (n - 1) of daily simple
//! returns, annualized with sqrt(252).

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::ledger::{EquityPoint, Side, TradeRecord};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const CALENDAR_DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// Non-positive fraction, e.g. -0.20 for a 20% peak-to-trough drop.
    pub max_drawdown: f64,
    pub trade_count: usize,
    pub win_rate: f64,
    pub final_value: f64,
    pub trading_days: usize,
    pub avg_holding_days: f64,
}

impl Summary {
    pub fn compute(trades: &[TradeRecord], equity_curve: &[EquityPoint], initial_cash: f64) -> Self {
        let final_value = equity_curve
            .last()
            .map(|p| p.total_value)
            .unwrap_or(initial_cash);

        let total_return = if initial_cash > 0.0 {
            final_value / initial_cash - 1.0
        } else {
            0.0
        };

        let annualized_return = annualize(total_return, equity_curve);
        let returns = daily_returns(equity_curve);
        let (volatility, sharpe_ratio) = risk_stats(&returns);
        let max_drawdown = max_drawdown(equity_curve);
        let (win_rate, avg_holding_days) = close_stats(trades);

        Summary {
            total_return,
            annualized_return,
            volatility,
            sharpe_ratio,
            max_drawdown,
            trade_count: trades.len(),
            win_rate,
            final_value,
            trading_days: equity_curve.len(),
            avg_holding_days,
        }
    }
}

/// Compound the total return over elapsed calendar days. With fewer
/// than two points (or a zero-day span) the total return is reported
/// unannualized.
fn annualize(total_return: f64, equity_curve: &[EquityPoint]) -> f64 {
    let (first, last) = match (equity_curve.first(), equity_curve.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return total_return,
    };
    let elapsed_days = (last.date - first.date).num_days();
    if elapsed_days <= 0 || !total_return.is_finite() {
        return total_return;
    }
    (1.0 + total_return).powf(CALENDAR_DAYS_PER_YEAR / elapsed_days as f64) - 1.0
}

fn daily_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].total_value;
            let curr = w[1].total_value;
            if prev > 0.0 { curr / prev - 1.0 } else { 0.0 }
        })
        .collect()
}

/// Annualized volatility and Sharpe ratio from daily returns. Sample
/// standard deviation; both are 0 when the series is too short or has
/// zero variance.
fn risk_stats(returns: &[f64]) -> (f64, f64) {
    let n = returns.len();
    if n < 2 {
        return (0.0, 0.0);
    }
    let mean = returns.iter().sum::<f64>() / n as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let stddev = variance.sqrt();
    if stddev > 0.0 {
        let annual = TRADING_DAYS_PER_YEAR.sqrt();
        (stddev * annual, mean / stddev * annual)
    } else {
        (0.0, 0.0)
    }
}

/// Worst peak-to-trough decline as a non-positive fraction.
fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for point in equity_curve {
        if point.total_value > peak {
            peak = point.total_value;
        }
        if peak > 0.0 {
            let dd = point.total_value / peak - 1.0;
            if dd < worst {
                worst = dd;
            }
        }
    }
    worst
}

struct OpenLot {
    quantity: u64,
    average_cost: f64,
    entry_date: NaiveDate,
}

/// Win rate over closing sells and average holding period, recovered by
/// replaying the trade log: a sell is a profitable close when its
/// proceeds exceed the cost basis of the sold shares at the position's
/// average cost.
fn close_stats(trades: &[TradeRecord]) -> (f64, f64) {
    let mut open: BTreeMap<&str, OpenLot> = BTreeMap::new();
    let mut closes = 0usize;
    let mut profitable = 0usize;
    let mut full_exits = 0usize;
    let mut holding_days = 0i64;

    for trade in trades {
        match trade.side {
            Side::Buy => {
                let lot = open.entry(trade.symbol.as_str()).or_insert(OpenLot {
                    quantity: 0,
                    average_cost: 0.0,
                    entry_date: trade.date,
                });
                let total_cost =
                    lot.quantity as f64 * lot.average_cost + trade.quantity as f64 * trade.price;
                if lot.quantity == 0 {
                    lot.entry_date = trade.date;
                }
                lot.quantity += trade.quantity;
                if lot.quantity > 0 {
                    lot.average_cost = total_cost / lot.quantity as f64;
                }
            }
            Side::Sell => {
                let Some(lot) = open.get_mut(trade.symbol.as_str()) else {
                    continue;
                };
                let sold = trade.quantity.min(lot.quantity);
                if sold == 0 {
                    continue;
                }
                let proceeds = sold as f64 * trade.price;
                let basis = sold as f64 * lot.average_cost;
                closes += 1;
                if proceeds > basis {
                    profitable += 1;
                }
                lot.quantity -= sold;
                if lot.quantity == 0 {
                    full_exits += 1;
                    holding_days += (trade.date - lot.entry_date).num_days();
                    open.remove(trade.symbol.as_str());
                }
            }
        }
    }

    let win_rate = if closes > 0 {
        profitable as f64 / closes as f64
    } else {
        0.0
    };
    let avg_holding_days = if full_exits > 0 {
        holding_days as f64 / full_exits as f64
    } else {
        0.0
    };
    (win_rate, avg_holding_days)
}
