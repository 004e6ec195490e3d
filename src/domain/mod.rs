//! Core domain types and decision logic.

pub mod arbiter;
pub mod bar;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod instrument;
pub mod lifecycle;
pub mod market;
pub mod params;
pub mod pattern;
pub mod position;
pub mod regime;
pub mod signal;
pub mod sizing;
pub mod squeeze;

#[cfg(test)]
pub(crate) mod test_support;
