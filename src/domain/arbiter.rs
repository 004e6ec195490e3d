//! Signal arbitration.
//!
//! Generators run in a fixed priority order and the first signal wins.
//! A generator is skipped when it is disabled, when its strategy identity
//! already holds a position or pending order, or (mean reversion only)
//! when the market is not ranging. Nothing runs unless the minimum
//! volatility gate passes.

use crate::domain::market::MarketView;
use crate::domain::params::EngineParams;
use crate::domain::position::Exposure;
use crate::domain::regime::{classify_regime, Regime};
use crate::domain::signal::{
    doji_bounce, mean_reversion_bounce, squeeze_breakout, trend_follow_crossover, Direction,
    Signal, SignalOrigin,
};

/// Evaluation order. Earlier entries win.
pub const PRIORITY: [SignalOrigin; 4] = [
    SignalOrigin::DojiBounce,
    SignalOrigin::MeanReversionBounce,
    SignalOrigin::SqueezeBreakout,
    SignalOrigin::TrendFollowCrossover,
];

fn is_enabled(origin: SignalOrigin, params: &EngineParams) -> bool {
    match origin {
        SignalOrigin::DojiBounce => params.strategies.doji_bounce,
        SignalOrigin::MeanReversionBounce => params.strategies.mean_reversion,
        SignalOrigin::SqueezeBreakout => params.strategies.squeeze_breakout,
        SignalOrigin::TrendFollowCrossover => params.strategies.trend_follow,
    }
}

fn generate(origin: SignalOrigin, market: &MarketView, params: &EngineParams) -> Option<Direction> {
    match origin {
        SignalOrigin::DojiBounce => doji_bounce(market, params),
        SignalOrigin::MeanReversionBounce => mean_reversion_bounce(market, params),
        SignalOrigin::SqueezeBreakout => squeeze_breakout(market, params),
        SignalOrigin::TrendFollowCrossover => trend_follow_crossover(market, params),
    }
}

/// ATR[1] ≥ ATR[2] × min_atr_multiplier. Unavailable ATR fails the gate.
pub fn volatility_gate_passes(market: &MarketView, params: &EngineParams) -> bool {
    let kind = params.atr();
    match (market.value(&kind, 1), market.value(&kind, 2)) {
        (Some(current), Some(previous)) => current >= previous * params.regime.min_atr_multiplier,
        _ => false,
    }
}

pub fn arbitrate(
    market: &MarketView,
    params: &EngineParams,
    exposure: &Exposure,
    point: f64,
) -> Option<Signal> {
    if !volatility_gate_passes(market, params) {
        tracing::debug!("volatility gate closed, skipping signal evaluation");
        return None;
    }
    let regime = classify_regime(market, params, point);

    PRIORITY.iter().find_map(|&origin| {
        if !is_enabled(origin, params) {
            return None;
        }
        if exposure.is_occupied(origin.strategy()) {
            tracing::debug!(origin = origin.label(), "strategy already exposed");
            return None;
        }
        if origin == SignalOrigin::MeanReversionBounce && regime != Regime::Ranging {
            tracing::debug!(?regime, "mean reversion gated off outside a ranging market");
            return None;
        }
        generate(origin, market, params).map(|direction| Signal::new(direction, origin))
    })
}
