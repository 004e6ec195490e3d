//! Bollinger squeeze detection.
//!
//! width = (upper - lower) / middle. A squeeze is active only when the
//! width at the last closed bar is both within `ATR × max_width_atr_multiplier`
//! and the narrowest over the trailing `lookback_bars` closed bars
//! (inclusive of itself). Too little history, or any lookback bar without
//! bands, means no squeeze.

use crate::domain::indicator::BandLine;
use crate::domain::market::MarketView;
use crate::domain::params::EngineParams;

/// Band width at `offset`; `None` if any band is unavailable.
pub fn band_width(market: &MarketView, params: &EngineParams, offset: usize) -> Option<f64> {
    let upper = market.value(&params.band(BandLine::Upper), offset)?;
    let middle = market.value(&params.band(BandLine::Middle), offset)?;
    let lower = market.value(&params.band(BandLine::Lower), offset)?;
    Some((upper - lower) / middle)
}

/// The width at offset 1 is no wider than anything else in the lookback.
/// Fails when the lookback reaches past the available history or a bar in
/// it has unavailable bands.
pub fn is_lookback_minimum(market: &MarketView, params: &EngineParams, width: f64) -> bool {
    let lookback = params.squeeze.lookback_bars;
    if market.bars_available() <= lookback {
        return false;
    }
    (2..=lookback).all(|offset| band_width(market, params, offset).is_some_and(|w| width <= w))
}

pub fn is_squeeze_active(market: &MarketView, params: &EngineParams) -> bool {
    let Some(width) = band_width(market, params, 1) else {
        return false;
    };
    let Some(atr) = market.value(&params.atr(), 1) else {
        return false;
    };
    if width > atr * params.squeeze.max_width_atr_multiplier {
        return false;
    }
    is_lookback_minimum(market, params, width)
}
