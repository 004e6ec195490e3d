//! bandtrader: rule-based Bollinger band and trend-follow trading engine.
//!
//! Hexagonal architecture: decision logic in [`domain`], collaborator traits
//! in [`ports`], concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
