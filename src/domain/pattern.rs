//! Candlestick pattern recognition.
//!
//! Every pattern except Doji shares a minimum-body gate: the confirming
//! body must be at least `ATR × min_body_atr_multiplier`. Zero-range bars
//! and a zero ATR never match anything.

use crate::domain::bar::Bar;
use crate::domain::params::PatternParams;

const HAMMER_MAX_BODY_RATIO: f64 = 0.3;
const HAMMER_MIN_SHADOW_BODY_MULT: f64 = 2.0;
const HAMMER_MAX_OPPOSITE_SHADOW_BODY_MULT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    None,
    Doji,
    Hammer,
    ShootingStar,
    BullishEngulfing,
    BearishEngulfing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternResult {
    pub pattern: Pattern,
    /// Body size of the classified bar, used for the minimum-size check.
    pub body: f64,
}

impl PatternResult {
    fn none(body: f64) -> Self {
        PatternResult {
            pattern: Pattern::None,
            body,
        }
    }
}

fn passes_body_gate(bar: &Bar, atr: f64, min_body_atr_multiplier: f64) -> bool {
    atr > 0.0 && bar.body() >= atr * min_body_atr_multiplier
}

/// body / range ≤ max_body_ratio, with range > 0.
pub fn is_doji(bar: &Bar, max_body_ratio: f64) -> bool {
    let range = bar.range();
    if range <= 0.0 {
        return false;
    }
    bar.body() / range <= max_body_ratio
}

pub fn is_hammer(bar: &Bar, atr: f64, min_body_atr_multiplier: f64) -> bool {
    let range = bar.range();
    if range <= 0.0 || !passes_body_gate(bar, atr, min_body_atr_multiplier) {
        return false;
    }
    let body = bar.body();
    body / range <= HAMMER_MAX_BODY_RATIO
        && bar.lower_shadow() >= HAMMER_MIN_SHADOW_BODY_MULT * body
        && bar.upper_shadow() <= HAMMER_MAX_OPPOSITE_SHADOW_BODY_MULT * body
}

pub fn is_shooting_star(bar: &Bar, atr: f64, min_body_atr_multiplier: f64) -> bool {
    let range = bar.range();
    if range <= 0.0 || !passes_body_gate(bar, atr, min_body_atr_multiplier) {
        return false;
    }
    let body = bar.body();
    body / range <= HAMMER_MAX_BODY_RATIO
        && bar.upper_shadow() >= HAMMER_MIN_SHADOW_BODY_MULT * body
        && bar.lower_shadow() <= HAMMER_MAX_OPPOSITE_SHADOW_BODY_MULT * body
}

/// `current` is bullish and its body contains the bearish `previous` body.
pub fn is_bullish_engulfing(
    current: &Bar,
    previous: &Bar,
    atr: f64,
    min_body_atr_multiplier: f64,
) -> bool {
    if current.range() <= 0.0 || !passes_body_gate(current, atr, min_body_atr_multiplier) {
        return false;
    }
    previous.is_bearish()
        && current.is_bullish()
        && current.close > previous.open
        && current.open < previous.close
}

/// `current` is bearish and its body contains the bullish `previous` body.
pub fn is_bearish_engulfing(
    current: &Bar,
    previous: &Bar,
    atr: f64,
    min_body_atr_multiplier: f64,
) -> bool {
    if current.range() <= 0.0 || !passes_body_gate(current, atr, min_body_atr_multiplier) {
        return false;
    }
    previous.is_bullish()
        && current.is_bearish()
        && current.close < previous.open
        && current.open > previous.close
}

/// Classify `current` (optionally against the bar before it).
///
/// Two-bar patterns take precedence over single-bar ones, and Doji is
/// reported only when nothing stronger matched.
pub fn classify(
    current: &Bar,
    previous: Option<&Bar>,
    atr: f64,
    params: &PatternParams,
) -> PatternResult {
    let body = current.body();
    if current.range() <= 0.0 {
        return PatternResult::none(body);
    }
    let mult = params.min_body_atr_multiplier;

    let pattern = match previous {
        Some(prev) if is_bullish_engulfing(current, prev, atr, mult) => Pattern::BullishEngulfing,
        Some(prev) if is_bearish_engulfing(current, prev, atr, mult) => Pattern::BearishEngulfing,
        _ if is_hammer(current, atr, mult) => Pattern::Hammer,
        _ if is_shooting_star(current, atr, mult) => Pattern::ShootingStar,
        _ if is_doji(current, params.max_doji_body_ratio) => Pattern::Doji,
        _ => Pattern::None,
    };
    PatternResult { pattern, body }
}
