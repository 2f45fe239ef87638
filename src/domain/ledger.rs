//! Portfolio ledger: cash and position state under solvency invariants.
//!
//! The ledger is the only component allowed to mutate cash and positions,
//! and it enforces `cash >= 0` and `quantity >= 0` by rejecting any trade
//! that would violate them. Rejections are values, not errors: the engine
//! records them for diagnostics and continues the run.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// One executed trade. Append-only, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub side: Side,
    pub price: f64,
    pub quantity: u64,
    pub cash_after: f64,
}

/// Why the ledger refused a trade.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    #[error("insufficient cash: need {required:.2}, have {available:.2}")]
    InsufficientCash { required: f64, available: f64 },

    #[error("insufficient shares: requested {requested}, held {held}")]
    InsufficientShares { requested: u64, held: u64 },

    #[error("position sizing produced zero quantity")]
    ZeroQuantity,
}

/// A refused trade attempt, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedTrade {
    pub symbol: String,
    pub date: NaiveDate,
    pub side: Side,
    pub reason: RejectReason,
}

/// One portfolio snapshot per simulated trading date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub cash: f64,
    pub market_value: f64,
    pub total_value: f64,
}

/// Cash, positions, and the append-only trade/equity logs for one run.
///
/// Positions live in a `BTreeMap` so market-value summation happens in a
/// fixed symbol order and two identical runs are bit-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub cash: f64,
    pub initial_cash: f64,
    positions: BTreeMap<String, Position>,
    pub trades: Vec<TradeRecord>,
    pub rejections: Vec<RejectedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Ledger {
    pub fn new(initial_cash: f64) -> Self {
        Ledger {
            cash: initial_cash,
            initial_cash,
            positions: BTreeMap::new(),
            trades: Vec::new(),
            rejections: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn holds(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn open_position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn held_quantity(&self, symbol: &str) -> u64 {
        self.positions.get(symbol).map_or(0, |p| p.quantity)
    }

    /// Execute one trade, or reject it if it would break an invariant.
    ///
    /// Buy: debit cash, grow the position, recompute weighted average
    /// cost. Sell: credit cash at the trade price, shrink the position,
    /// drop it at zero.
    pub fn apply_trade(
        &mut self,
        symbol: &str,
        side: Side,
        quantity: u64,
        price: f64,
        date: NaiveDate,
    ) -> Result<&TradeRecord, RejectReason> {
        if quantity == 0 {
            return Err(RejectReason::ZeroQuantity);
        }

        match side {
            Side::Buy => {
                let cost = quantity as f64 * price;
                if cost > self.cash {
                    return Err(RejectReason::InsufficientCash {
                        required: cost,
                        available: self.cash,
                    });
                }
                self.cash -= cost;
                self.positions
                    .entry(symbol.to_string())
                    .and_modify(|pos| pos.add(quantity, price))
                    .or_insert_with(|| Position::open(symbol.to_string(), quantity, price));
            }
            Side::Sell => {
                let held = self.held_quantity(symbol);
                if quantity > held {
                    return Err(RejectReason::InsufficientShares {
                        requested: quantity,
                        held,
                    });
                }
                self.cash += quantity as f64 * price;
                if let Some(pos) = self.positions.get_mut(symbol) {
                    pos.reduce(quantity);
                    if pos.quantity == 0 {
                        self.positions.remove(symbol);
                    }
                }
            }
        }

        self.trades.push(TradeRecord {
            symbol: symbol.to_string(),
            date,
            side,
            price,
            quantity,
            cash_after: self.cash,
        });
        Ok(self.trades.last().expect("trade just pushed"))
    }

    pub fn record_rejection(
        &mut self,
        symbol: &str,
        date: NaiveDate,
        side: Side,
        reason: RejectReason,
    ) {
        self.rejections.push(RejectedTrade {
            symbol: symbol.to_string(),
            date,
            side,
            reason,
        });
    }

    /// Market value of all held positions at the latest known closes.
    pub fn market_value(&self, last_close: &BTreeMap<String, f64>) -> f64 {
        self.positions
            .values()
            .filter_map(|pos| {
                last_close
                    .get(&pos.symbol)
                    .map(|&price| pos.market_value(price))
            })
            .sum()
    }

    /// Append one equity snapshot for `date`. The caller supplies the
    /// latest known close per symbol, carrying forward prices for
    /// symbols without a bar on this date.
    pub fn mark_to_market(
        &mut self,
        date: NaiveDate,
        last_close: &BTreeMap<String, f64>,
    ) -> &EquityPoint {
        let market_value = self.market_value(last_close);
        self.equity_curve.push(EquityPoint {
            date,
            cash: self.cash,
            market_value,
            total_value: self.cash + market_value,
        });
        self.equity_curve.last().expect("point just pushed")
    }
}
