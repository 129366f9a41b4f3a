//! marketscan: regime-aware signals, bottom-seeking screens and option
//! valuation for daily equity bars.
//!
//! Hexagonal architecture: analytics in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], command dispatch in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
