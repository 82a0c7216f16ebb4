//! Core domain types and logic.

pub mod account;
pub mod backtest;
pub mod broker;
pub mod config_validation;
pub mod error;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod signal;
pub mod strategy;
pub mod window;
