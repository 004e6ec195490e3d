//! Market regime classification from the slope of a long EMA.
//!
//! slope = |EMA[1] - EMA[2]| / point. At or below `max_slope_points` the
//! market is ranging, above it trending. Missing inputs classify as
//! `Unknown`, which is never treated as ranging.

use crate::domain::market::MarketView;
use crate::domain::params::EngineParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Ranging,
    Trending,
    Unknown,
}

impl Regime {
    pub fn is_ranging(&self) -> bool {
        *self == Regime::Ranging
    }
}

/// Slope of the regime EMA between the last two closed bars, in points.
pub fn ema_slope_points(market: &MarketView, params: &EngineParams, point: f64) -> Option<f64> {
    if point <= 0.0 {
        return None;
    }
    let kind = params.regime_ema();
    let recent = market.value(&kind, 1)?;
    let prior = market.value(&kind, 2)?;
    Some((recent - prior).abs() / point)
}

pub fn classify_regime(market: &MarketView, params: &EngineParams, point: f64) -> Regime {
    match ema_slope_points(market, params, point) {
        Some(slope) if slope <= params.regime.max_slope_points => Regime::Ranging,
        Some(_) => Regime::Trending,
        None => Regime::Unknown,
    }
}
