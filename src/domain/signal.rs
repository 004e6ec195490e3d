//! Trade signals and the four strategy signal generators.
//!
//! Generators are pure functions of the market view. They read closed
//! bars (offset ≥ 1); only the Doji bounce also looks at the forming bar
//! (offset 0) to confirm the bounce.

use std::fmt;

use crate::domain::indicator::BandLine;
use crate::domain::market::MarketView;
use crate::domain::params::{EngineParams, StrategyToggles};
use crate::domain::pattern::{classify, is_doji, Pattern};
use crate::domain::squeeze::is_squeeze_active;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

/// Strategy family owning a position. At most one position or pending
/// order may exist per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyId {
    Bollinger,
    TrendFollow,
}

impl StrategyId {
    /// Broker-side tag for this identity.
    pub fn magic(&self, strategies: &StrategyToggles) -> i64 {
        match self {
            StrategyId::Bollinger => strategies.bollinger_magic,
            StrategyId::TrendFollow => strategies.trend_magic,
        }
    }

    pub fn from_magic(magic: i64, strategies: &StrategyToggles) -> Option<StrategyId> {
        if magic == strategies.bollinger_magic {
            Some(StrategyId::Bollinger)
        } else if magic == strategies.trend_magic {
            Some(StrategyId::TrendFollow)
        } else {
            None
        }
    }
}

/// Which generator produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOrigin {
    DojiBounce,
    MeanReversionBounce,
    SqueezeBreakout,
    TrendFollowCrossover,
}

impl SignalOrigin {
    pub fn strategy(&self) -> StrategyId {
        match self {
            SignalOrigin::TrendFollowCrossover => StrategyId::TrendFollow,
            _ => StrategyId::Bollinger,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalOrigin::DojiBounce => "doji_bounce",
            SignalOrigin::MeanReversionBounce => "mean_reversion",
            SignalOrigin::SqueezeBreakout => "squeeze_breakout",
            SignalOrigin::TrendFollowCrossover => "trend_follow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub direction: Direction,
    pub strategy: StrategyId,
    pub origin: SignalOrigin,
}

impl Signal {
    pub fn new(direction: Direction, origin: SignalOrigin) -> Self {
        Signal {
            direction,
            strategy: origin.strategy(),
            origin,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => f.write_str("BUY"),
            Direction::Sell => f.write_str("SELL"),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.direction, self.origin.label())
    }
}

/// Doji at offset 1 whose wick pierced a band, confirmed by the forming bar
/// closing back through the Doji's opposite extreme. Buy is checked first.
pub fn doji_bounce(market: &MarketView, params: &EngineParams) -> Option<Direction> {
    let doji = market.bar(1)?;
    if !is_doji(&doji, params.patterns.max_doji_body_ratio) {
        return None;
    }
    let forming = market.bar(0)?;
    let lower = market.value(&params.band(BandLine::Lower), 1)?;
    let upper = market.value(&params.band(BandLine::Upper), 1)?;

    if doji.low < lower && forming.is_bullish() && forming.close > doji.high {
        return Some(Direction::Buy);
    }
    if doji.high > upper && forming.is_bearish() && forming.close < doji.low {
        return Some(Direction::Sell);
    }
    None
}

/// Bar at offset 1 pierced a band, closed back inside it and printed a
/// reversal pattern (engulfing against offset 2, or hammer / shooting star).
pub fn mean_reversion_bounce(market: &MarketView, params: &EngineParams) -> Option<Direction> {
    let bar = market.bar(1)?;
    let previous = market.bar(2)?;
    let atr = market.value(&params.atr(), 1)?;
    let lower = market.value(&params.band(BandLine::Lower), 1)?;
    let upper = market.value(&params.band(BandLine::Upper), 1)?;
    // Two-bar patterns shadow single-bar ones in `classify`, so ask for both.
    let two_bar = classify(&bar, Some(&previous), atr, &params.patterns).pattern;
    let single_bar = classify(&bar, None, atr, &params.patterns).pattern;
    let printed = |a: Pattern, b: Pattern| [two_bar, single_bar].iter().any(|p| *p == a || *p == b);

    if bar.low < lower && bar.close > lower && printed(Pattern::BullishEngulfing, Pattern::Hammer) {
        return Some(Direction::Buy);
    }
    if bar.high > upper && bar.close < upper && printed(Pattern::BearishEngulfing, Pattern::ShootingStar) {
        return Some(Direction::Sell);
    }
    None
}

/// Close at offset 1 outside the bands while a squeeze is active.
pub fn squeeze_breakout(market: &MarketView, params: &EngineParams) -> Option<Direction> {
    if !is_squeeze_active(market, params) {
        return None;
    }
    let bar = market.bar(1)?;
    let upper = market.value(&params.band(BandLine::Upper), 1)?;
    let lower = market.value(&params.band(BandLine::Lower), 1)?;

    if bar.close > upper {
        Some(Direction::Buy)
    } else if bar.close < lower {
        Some(Direction::Sell)
    } else {
        None
    }
}

/// Direction of a fast/slow crossover between offsets 2 and 1.
pub fn ma_crossover(market: &MarketView, params: &EngineParams) -> Option<Direction> {
    let fast_prev = market.value(&params.trend_fast(), 2)?;
    let slow_prev = market.value(&params.trend_slow(), 2)?;
    let fast = market.value(&params.trend_fast(), 1)?;
    let slow = market.value(&params.trend_slow(), 1)?;

    if fast_prev <= slow_prev && fast > slow {
        Some(Direction::Buy)
    } else if fast_prev >= slow_prev && fast < slow {
        Some(Direction::Sell)
    } else {
        None
    }
}

pub fn trend_follow_crossover(market: &MarketView, params: &EngineParams) -> Option<Direction> {
    ma_crossover(market, params)
}
