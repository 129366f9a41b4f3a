//! Core domain types and analytics. No I/O happens below this module.

pub mod ohlcv;
pub mod error;
pub mod indicator;
pub mod config;
pub mod config_validation;
pub mod regime;
pub mod signals;
pub mod scoring;
pub mod analyzer;
pub mod screener;
pub mod options;
pub mod mc_backtest;
