//! Concrete strategy implementations.

pub mod ma_crossover;
pub mod red_three_soldiers;
