//! Core domain types and logic.

pub mod bar;
pub mod bar_table;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod position;
pub mod strategies;
pub mod strategy;
