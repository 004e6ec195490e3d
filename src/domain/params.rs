//! Engine parameters: the full configuration surface with defaults.

use crate::domain::error::EngineError;
use crate::domain::indicator::{AppliedPrice, BandLine, IndicatorKind, MaMethod};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskParams {
    pub risk_percent: f64,
    pub atr_stop_multiplier: f64,
    /// Validated at startup but not used: targets are always 3x the dynamic stop.
    pub take_profit_points: f64,
    pub max_volume: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandParams {
    pub period: usize,
    pub deviation: f64,
    pub method: MaMethod,
    pub applied_price: AppliedPrice,
    pub atr_period: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternParams {
    pub min_body_atr_multiplier: f64,
    pub max_doji_body_ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegimeParams {
    pub ema_period: usize,
    pub max_slope_points: f64,
    pub min_atr_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqueezeParams {
    pub lookback_bars: usize,
    pub max_width_atr_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub method: MaMethod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleParams {
    /// 0 disables breakeven.
    pub breakeven_trigger_points: f64,
    pub breakeven_buffer_points: f64,
    /// 0 disables trailing.
    pub trailing_stop_points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyToggles {
    pub doji_bounce: bool,
    pub mean_reversion: bool,
    pub squeeze_breakout: bool,
    pub trend_follow: bool,
    pub bollinger_magic: i64,
    pub trend_magic: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    pub risk: RiskParams,
    pub bands: BandParams,
    pub patterns: PatternParams,
    pub regime: RegimeParams,
    pub squeeze: SqueezeParams,
    pub trend: TrendParams,
    pub lifecycle: LifecycleParams,
    pub strategies: StrategyToggles,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            risk: RiskParams {
                risk_percent: 1.0,
                atr_stop_multiplier: 1.5,
                take_profit_points: 600.0,
                max_volume: 1.0,
            },
            bands: BandParams {
                period: 20,
                deviation: 2.0,
                method: MaMethod::Sma,
                applied_price: AppliedPrice::Close,
                atr_period: 14,
            },
            patterns: PatternParams {
                min_body_atr_multiplier: 0.3,
                max_doji_body_ratio: 0.1,
            },
            regime: RegimeParams {
                ema_period: 200,
                max_slope_points: 5.0,
                min_atr_multiplier: 0.8,
            },
            squeeze: SqueezeParams {
                lookback_bars: 100,
                max_width_atr_multiplier: 1.0,
            },
            trend: TrendParams {
                fast_period: 20,
                slow_period: 50,
                method: MaMethod::Ema,
            },
            lifecycle: LifecycleParams {
                breakeven_trigger_points: 200.0,
                breakeven_buffer_points: 20.0,
                trailing_stop_points: 0.0,
            },
            strategies: StrategyToggles {
                doji_bounce: true,
                mean_reversion: true,
                squeeze_breakout: true,
                trend_follow: true,
                bollinger_magic: 1001,
                trend_magic: 2002,
            },
        }
    }
}

impl EngineParams {
    pub fn band(&self, line: BandLine) -> IndicatorKind {
        IndicatorKind::Bands {
            period: self.bands.period,
            deviation_x100: (self.bands.deviation * 100.0).round() as u32,
            method: self.bands.method,
            price: self.bands.applied_price,
            line,
        }
    }

    pub fn atr(&self) -> IndicatorKind {
        IndicatorKind::Atr(self.bands.atr_period)
    }

    pub fn regime_ema(&self) -> IndicatorKind {
        IndicatorKind::MovingAverage {
            period: self.regime.ema_period,
            method: MaMethod::Ema,
            price: AppliedPrice::Close,
        }
    }

    pub fn trend_fast(&self) -> IndicatorKind {
        IndicatorKind::MovingAverage {
            period: self.trend.fast_period,
            method: self.trend.method,
            price: AppliedPrice::Close,
        }
    }

    pub fn trend_slow(&self) -> IndicatorKind {
        IndicatorKind::MovingAverage {
            period: self.trend.slow_period,
            method: self.trend.method,
            price: AppliedPrice::Close,
        }
    }
}

/// Read parameters from a config source, falling back to defaults for
/// absent keys. Does not range-check; see `config_validation`.
pub fn build_params(config: &dyn ConfigPort) -> Result<EngineParams, EngineError> {
    let d = EngineParams::default();

    Ok(EngineParams {
        risk: RiskParams {
            risk_percent: config.get_double("risk", "risk_percent", d.risk.risk_percent),
            atr_stop_multiplier: config.get_double(
                "risk",
                "atr_stop_multiplier",
                d.risk.atr_stop_multiplier,
            ),
            take_profit_points: config.get_double(
                "risk",
                "take_profit_points",
                d.risk.take_profit_points,
            ),
            max_volume: config.get_double("risk", "max_volume", d.risk.max_volume),
        },
        bands: BandParams {
            period: get_period(config, "bands", "period", d.bands.period)?,
            deviation: config.get_double("bands", "deviation", d.bands.deviation),
            method: get_parsed(config, "bands", "method", d.bands.method)?,
            applied_price: get_parsed(config, "bands", "applied_price", d.bands.applied_price)?,
            atr_period: get_period(config, "bands", "atr_period", d.bands.atr_period)?,
        },
        patterns: PatternParams {
            min_body_atr_multiplier: config.get_double(
                "patterns",
                "min_body_atr_multiplier",
                d.patterns.min_body_atr_multiplier,
            ),
            max_doji_body_ratio: config.get_double(
                "patterns",
                "max_doji_body_ratio",
                d.patterns.max_doji_body_ratio,
            ),
        },
        regime: RegimeParams {
            ema_period: get_period(config, "regime", "ema_period", d.regime.ema_period)?,
            max_slope_points: config.get_double(
                "regime",
                "max_slope_points",
                d.regime.max_slope_points,
            ),
            min_atr_multiplier: config.get_double(
                "regime",
                "min_atr_multiplier",
                d.regime.min_atr_multiplier,
            ),
        },
        squeeze: SqueezeParams {
            lookback_bars: get_period(config, "squeeze", "lookback_bars", d.squeeze.lookback_bars)?,
            max_width_atr_multiplier: config.get_double(
                "squeeze",
                "max_width_atr_multiplier",
                d.squeeze.max_width_atr_multiplier,
            ),
        },
        trend: TrendParams {
            fast_period: get_period(config, "trend", "fast_period", d.trend.fast_period)?,
            slow_period: get_period(config, "trend", "slow_period", d.trend.slow_period)?,
            method: get_parsed(config, "trend", "method", d.trend.method)?,
        },
        lifecycle: LifecycleParams {
            breakeven_trigger_points: config.get_double(
                "lifecycle",
                "breakeven_trigger_points",
                d.lifecycle.breakeven_trigger_points,
            ),
            breakeven_buffer_points: config.get_double(
                "lifecycle",
                "breakeven_buffer_points",
                d.lifecycle.breakeven_buffer_points,
            ),
            trailing_stop_points: config.get_double(
                "lifecycle",
                "trailing_stop_points",
                d.lifecycle.trailing_stop_points,
            ),
        },
        strategies: StrategyToggles {
            doji_bounce: config.get_bool("strategies", "doji_bounce", d.strategies.doji_bounce),
            mean_reversion: config.get_bool(
                "strategies",
                "mean_reversion",
                d.strategies.mean_reversion,
            ),
            squeeze_breakout: config.get_bool(
                "strategies",
                "squeeze_breakout",
                d.strategies.squeeze_breakout,
            ),
            trend_follow: config.get_bool("strategies", "trend_follow", d.strategies.trend_follow),
            bollinger_magic: config.get_int(
                "strategies",
                "bollinger_magic",
                d.strategies.bollinger_magic,
            ),
            trend_magic: config.get_int("strategies", "trend_magic", d.strategies.trend_magic),
        },
    })
}

fn get_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, EngineError> {
    let value = config.get_int(section, key, default as i64);
    usize::try_from(value)
        .map_err(|_| EngineError::invalid(section, key, format!("{} must be non-negative", key)))
}

fn get_parsed<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, EngineError>
where
    T: std::str::FromStr<Err = String>,
{
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => {
            s.parse().map_err(|reason: String| EngineError::invalid(section, key, reason))
        }
        _ => Ok(default),
    }
}
