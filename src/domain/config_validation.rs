//! Parameter validation.
//!
//! Range-checks resolved parameters before the engine is constructed.

use crate::domain::error::EngineError;
use crate::domain::params::EngineParams;

pub fn validate_params(params: &EngineParams) -> Result<(), EngineError> {
    validate_risk(params)?;
    validate_bands(params)?;
    validate_patterns(params)?;
    validate_regime(params)?;
    validate_squeeze(params)?;
    validate_trend(params)?;
    validate_lifecycle(params)?;
    validate_strategies(params)?;
    Ok(())
}

fn validate_risk(params: &EngineParams) -> Result<(), EngineError> {
    let risk = &params.risk;
    if !(risk.risk_percent > 0.0 && risk.risk_percent <= 100.0) {
        return Err(EngineError::invalid(
            "risk",
            "risk_percent",
            "risk_percent must be in (0, 100]",
        ));
    }
    if risk.atr_stop_multiplier <= 0.0 {
        return Err(EngineError::invalid(
            "risk",
            "atr_stop_multiplier",
            "atr_stop_multiplier must be positive",
        ));
    }
    if risk.take_profit_points < 0.0 {
        return Err(EngineError::invalid(
            "risk",
            "take_profit_points",
            "take_profit_points must be non-negative",
        ));
    }
    if risk.max_volume <= 0.0 {
        return Err(EngineError::invalid(
            "risk",
            "max_volume",
            "max_volume must be positive",
        ));
    }
    Ok(())
}

fn validate_bands(params: &EngineParams) -> Result<(), EngineError> {
    let bands = &params.bands;
    if bands.period < 2 {
        return Err(EngineError::invalid(
            "bands",
            "period",
            "period must be at least 2",
        ));
    }
    if bands.deviation <= 0.0 {
        return Err(EngineError::invalid(
            "bands",
            "deviation",
            "deviation must be positive",
        ));
    }
    if bands.atr_period < 1 {
        return Err(EngineError::invalid(
            "bands",
            "atr_period",
            "atr_period must be at least 1",
        ));
    }
    Ok(())
}

fn validate_patterns(params: &EngineParams) -> Result<(), EngineError> {
    let patterns = &params.patterns;
    if patterns.min_body_atr_multiplier < 0.0 {
        return Err(EngineError::invalid(
            "patterns",
            "min_body_atr_multiplier",
            "min_body_atr_multiplier must be non-negative",
        ));
    }
    if !(patterns.max_doji_body_ratio > 0.0 && patterns.max_doji_body_ratio <= 1.0) {
        return Err(EngineError::invalid(
            "patterns",
            "max_doji_body_ratio",
            "max_doji_body_ratio must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_regime(params: &EngineParams) -> Result<(), EngineError> {
    let regime = &params.regime;
    if regime.ema_period < 1 {
        return Err(EngineError::invalid(
            "regime",
            "ema_period",
            "ema_period must be at least 1",
        ));
    }
    if regime.max_slope_points < 0.0 {
        return Err(EngineError::invalid(
            "regime",
            "max_slope_points",
            "max_slope_points must be non-negative",
        ));
    }
    if regime.min_atr_multiplier < 0.0 {
        return Err(EngineError::invalid(
            "regime",
            "min_atr_multiplier",
            "min_atr_multiplier must be non-negative",
        ));
    }
    Ok(())
}

fn validate_squeeze(params: &EngineParams) -> Result<(), EngineError> {
    let squeeze = &params.squeeze;
    if squeeze.lookback_bars < 2 {
        return Err(EngineError::invalid(
            "squeeze",
            "lookback_bars",
            "lookback_bars must be at least 2",
        ));
    }
    if squeeze.max_width_atr_multiplier <= 0.0 {
        return Err(EngineError::invalid(
            "squeeze",
            "max_width_atr_multiplier",
            "max_width_atr_multiplier must be positive",
        ));
    }
    Ok(())
}

fn validate_trend(params: &EngineParams) -> Result<(), EngineError> {
    let trend = &params.trend;
    if trend.fast_period < 1 {
        return Err(EngineError::invalid(
            "trend",
            "fast_period",
            "fast_period must be at least 1",
        ));
    }
    if trend.fast_period >= trend.slow_period {
        return Err(EngineError::invalid(
            "trend",
            "slow_period",
            format!(
                "slow_period ({}) must be greater than fast_period ({})",
                trend.slow_period, trend.fast_period
            ),
        ));
    }
    Ok(())
}

fn validate_lifecycle(params: &EngineParams) -> Result<(), EngineError> {
    let lifecycle = &params.lifecycle;
    if lifecycle.breakeven_trigger_points < 0.0 {
        return Err(EngineError::invalid(
            "lifecycle",
            "breakeven_trigger_points",
            "breakeven_trigger_points must be non-negative",
        ));
    }
    if lifecycle.breakeven_buffer_points < 0.0 {
        return Err(EngineError::invalid(
            "lifecycle",
            "breakeven_buffer_points",
            "breakeven_buffer_points must be non-negative",
        ));
    }
    if lifecycle.breakeven_trigger_points > 0.0
        && lifecycle.breakeven_buffer_points >= lifecycle.breakeven_trigger_points
    {
        return Err(EngineError::invalid(
            "lifecycle",
            "breakeven_buffer_points",
            "breakeven_buffer_points must be below breakeven_trigger_points",
        ));
    }
    if lifecycle.trailing_stop_points < 0.0 {
        return Err(EngineError::invalid(
            "lifecycle",
            "trailing_stop_points",
            "trailing_stop_points must be non-negative",
        ));
    }
    Ok(())
}

fn validate_strategies(params: &EngineParams) -> Result<(), EngineError> {
    let strategies = &params.strategies;
    if strategies.bollinger_magic <= 0 {
        return Err(EngineError::invalid(
            "strategies",
            "bollinger_magic",
            "bollinger_magic must be positive",
        ));
    }
    if strategies.trend_magic <= 0 {
        return Err(EngineError::invalid(
            "strategies",
            "trend_magic",
            "trend_magic must be positive",
        ));
    }
    if strategies.bollinger_magic == strategies.trend_magic {
        return Err(EngineError::invalid(
            "strategies",
            "trend_magic",
            "trend_magic must differ from bollinger_magic",
        ));
    }
    let any_enabled = strategies.doji_bounce
        || strategies.mean_reversion
        || strategies.squeeze_breakout
        || strategies.trend_follow;
    if !any_enabled {
        return Err(EngineError::invalid(
            "strategies",
            "trend_follow",
            "at least one strategy must be enabled",
        ));
    }
    Ok(())
}
