//! Risk-based position sizing and trade intent construction.
//!
//! Stop distance (points) = round(ATR × atr_stop_multiplier / point), or
//! `MIN_STOP_POINTS` when that is not positive. The target is always
//! `REWARD_RISK_MULTIPLE` times the stop, so the ratio holds whatever the
//! ATR does.
//!
//! Volume = (equity × risk% / 100) / (stop_points × tick_value), capped at
//! the configured maximum, rounded to the volume step and clamped to
//! [min_volume, min(max_volume, broker max)].

use crate::domain::bar::Quote;
use crate::domain::error::SizingError;
use crate::domain::instrument::InstrumentSpec;
use crate::domain::params::RiskParams;
use crate::domain::signal::{Direction, Signal, SignalOrigin, StrategyId};

pub const MIN_STOP_POINTS: f64 = 10.0;
pub const REWARD_RISK_MULTIPLE: f64 = 3.0;

const VOLUME_DECIMALS: f64 = 1e8;

/// A fully sized market order ready for the execution port.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub direction: Direction,
    pub strategy: StrategyId,
    pub origin: SignalOrigin,
    pub volume: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub stop_points: f64,
}

impl TradeIntent {
    pub fn label(&self) -> &'static str {
        self.origin.label()
    }
}

pub fn stop_distance_points(atr: f64, atr_stop_multiplier: f64, point: f64) -> f64 {
    let points = if point > 0.0 {
        (atr * atr_stop_multiplier / point).round()
    } else {
        0.0
    };
    if points > 0.0 { points } else { MIN_STOP_POINTS }
}

pub fn position_volume(
    equity: f64,
    risk_percent: f64,
    stop_points: f64,
    max_volume: f64,
    spec: &InstrumentSpec,
) -> Result<f64, SizingError> {
    if equity <= 0.0 {
        return Err(SizingError::NonPositiveEquity(equity));
    }
    if stop_points <= 0.0 {
        return Err(SizingError::NonPositiveStopDistance(stop_points));
    }
    if spec.tick_value <= 0.0 {
        return Err(SizingError::NonPositiveTickValue(spec.tick_value));
    }
    if spec.volume_step <= 0.0 {
        return Err(SizingError::InvalidVolumeStep(spec.volume_step));
    }

    let risk_money = equity * risk_percent / 100.0;
    let raw = risk_money / (stop_points * spec.tick_value);

    let capped = raw.min(max_volume);
    let stepped = (capped / spec.volume_step).round() * spec.volume_step;
    let upper = max_volume.min(spec.max_volume);
    let volume = stepped.max(spec.min_volume).min(upper);

    Ok((volume * VOLUME_DECIMALS).round() / VOLUME_DECIMALS)
}

/// Size `signal` against the current quote. `atr` is the last closed bar's
/// ATR, or `None` when unavailable (the minimum stop is used).
pub fn build_intent(
    signal: &Signal,
    quote: &Quote,
    atr: Option<f64>,
    equity: f64,
    risk: &RiskParams,
    spec: &InstrumentSpec,
) -> Result<TradeIntent, SizingError> {
    let stop_points = stop_distance_points(atr.unwrap_or(0.0), risk.atr_stop_multiplier, spec.point);
    let volume = position_volume(equity, risk.risk_percent, stop_points, risk.max_volume, spec)?;

    let stop_distance = spec.points_to_price(stop_points);
    let target_distance = spec.points_to_price(stop_points * REWARD_RISK_MULTIPLE);

    let (entry_price, stop_loss, take_profit) = match signal.direction {
        Direction::Buy => (
            quote.ask,
            quote.ask - stop_distance,
            quote.ask + target_distance,
        ),
        Direction::Sell => (
            quote.bid,
            quote.bid + stop_distance,
            quote.bid - target_distance,
        ),
    };

    Ok(TradeIntent {
        direction: signal.direction,
        strategy: signal.strategy,
        origin: signal.origin,
        volume,
        entry_price,
        stop_loss: spec.normalize_price(stop_loss),
        take_profit: spec.normalize_price(take_profit),
        stop_points,
    })
}
