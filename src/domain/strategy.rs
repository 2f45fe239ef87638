//! Strategy capability set and the default position-sizing policy.

use std::collections::BTreeMap;

use super::bar::Bar;
use super::error::{QuantsimError, StrategyError};
use super::strategies::ma_crossover::MaCrossover;
use super::strategies::red_three_soldiers::RedThreeSoldiers;

/// Per-bar strategy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Ledger state a sizing call is allowed to see.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingContext {
    pub available_cash: f64,
    pub max_position_pct: f64,
    pub max_open_positions: usize,
    pub open_positions: usize,
}

/// Default sizing: divide the allocatable cash equally among the open
/// position slots and buy whole shares.
///
/// `floor((available_cash * max_position_pct / open_slots) / price)`;
/// zero when no slot is free or the price is not positive.
pub fn default_position_size(price: f64, ctx: &SizingContext) -> u64 {
    let open_slots = ctx.max_open_positions.saturating_sub(ctx.open_positions);
    if open_slots == 0 || price <= 0.0 {
        return 0;
    }
    let allocation = ctx.available_cash * ctx.max_position_pct / open_slots as f64;
    (allocation / price).floor() as u64
}

/// A rule-based trading strategy.
///
/// The engine calls `initialize` exactly once before the first date,
/// then `on_bar` once per (symbol, date) pair in engine-defined order.
/// Implementations may only read and update their own internal state;
/// they must not assume any particular symbol ordering. Any error
/// returned from these calls aborts the run.
pub trait Strategy: std::fmt::Debug {
    fn name(&self) -> &str;

    fn initialize(&mut self) -> Result<(), StrategyError>;

    fn on_bar(&mut self, symbol: &str, bar: &Bar) -> Result<Signal, StrategyError>;

    /// Shares to buy on a Buy signal. Override for custom sizing.
    fn position_size(
        &self,
        _symbol: &str,
        price: f64,
        ctx: &SizingContext,
    ) -> Result<u64, StrategyError> {
        Ok(default_position_size(price, ctx))
    }
}

/// Resolve a strategy by its configured name.
pub fn build_strategy(
    name: &str,
    params: &BTreeMap<String, String>,
) -> Result<Box<dyn Strategy>, QuantsimError> {
    match name {
        "ma_crossover" => Ok(Box::new(MaCrossover::from_params(params)?)),
        "red_three_soldiers" => Ok(Box::new(RedThreeSoldiers::new())),
        _ => Err(QuantsimError::UnknownStrategy {
            name: name.to_string(),
        }),
    }
}

/// Parse an integer strategy parameter, falling back to `default` when
/// the key is absent.
pub fn parse_usize_param(
    params: &BTreeMap<String, String>,
    key: &str,
    default: usize,
) -> Result<usize, QuantsimError> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| QuantsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: key.to_string(),
            reason: format!("expected a positive integer, got {:?}", raw),
        }),
    }
}
