//! Technical indicator definitions and series.
//!
//! - `IndicatorKind`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorSeries`: a time series of indicator values, one per bar

pub mod atr;
pub mod bollinger;
pub mod moving_average;

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

use crate::domain::bar::Bar;

/// Averaging method for moving averages and the Bollinger middle band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaMethod {
    Sma,
    Ema,
    Smma,
    Lwma,
}

/// Which bar price an indicator is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppliedPrice {
    Close,
    Open,
    High,
    Low,
    Median,
    Typical,
    Weighted,
}

impl AppliedPrice {
    pub fn of(&self, bar: &Bar) -> f64 {
        match self {
            AppliedPrice::Close => bar.close,
            AppliedPrice::Open => bar.open,
            AppliedPrice::High => bar.high,
            AppliedPrice::Low => bar.low,
            AppliedPrice::Median => bar.median_price(),
            AppliedPrice::Typical => bar.typical_price(),
            AppliedPrice::Weighted => bar.weighted_price(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandLine {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    MovingAverage {
        period: usize,
        method: MaMethod,
        price: AppliedPrice,
    },
    Bands {
        period: usize,
        deviation_x100: u32,
        method: MaMethod,
        price: AppliedPrice,
        line: BandLine,
    },
    Atr(usize),
}

impl IndicatorKind {
    /// The same indicator with the band line collapsed, so all three
    /// Bollinger lines share one computed series.
    pub fn series_key(&self) -> IndicatorKind {
        match *self {
            IndicatorKind::Bands {
                period,
                deviation_x100,
                method,
                price,
                ..
            } => IndicatorKind::Bands {
                period,
                deviation_x100,
                method,
                price,
                line: BandLine::Middle,
            },
            other => other,
        }
    }

    pub fn with_line(&self, line: BandLine) -> IndicatorKind {
        match *self {
            IndicatorKind::Bands {
                period,
                deviation_x100,
                method,
                price,
                ..
            } => IndicatorKind::Bands {
                period,
                deviation_x100,
                method,
                price,
                line,
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bands { upper: f64, middle: f64, lower: f64 },
}

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub time: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub kind: IndicatorKind,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value of `kind` at bar `index`, `None` during warmup or out of range.
    pub fn value_at(&self, index: usize, kind: &IndicatorKind) -> Option<f64> {
        let point = self.values.get(index)?;
        if !point.valid {
            return None;
        }
        match (&point.value, kind) {
            (IndicatorValue::Simple(v), _) => Some(*v),
            (
                IndicatorValue::Bands {
                    upper,
                    middle,
                    lower,
                },
                IndicatorKind::Bands { line, .. },
            ) => Some(match line {
                BandLine::Upper => *upper,
                BandLine::Middle => *middle,
                BandLine::Lower => *lower,
            }),
            (IndicatorValue::Bands { middle, .. }, _) => Some(*middle),
        }
    }
}

impl fmt::Display for MaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MaMethod::Sma => "sma",
            MaMethod::Ema => "ema",
            MaMethod::Smma => "smma",
            MaMethod::Lwma => "lwma",
        };
        f.write_str(name)
    }
}

impl FromStr for MaMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sma" | "simple" => Ok(MaMethod::Sma),
            "ema" | "exponential" => Ok(MaMethod::Ema),
            "smma" | "smoothed" => Ok(MaMethod::Smma),
            "lwma" | "wma" | "linear_weighted" => Ok(MaMethod::Lwma),
            other => Err(format!("unknown moving average method '{}'", other)),
        }
    }
}

impl fmt::Display for AppliedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppliedPrice::Close => "close",
            AppliedPrice::Open => "open",
            AppliedPrice::High => "high",
            AppliedPrice::Low => "low",
            AppliedPrice::Median => "median",
            AppliedPrice::Typical => "typical",
            AppliedPrice::Weighted => "weighted",
        };
        f.write_str(name)
    }
}

impl FromStr for AppliedPrice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "close" => Ok(AppliedPrice::Close),
            "open" => Ok(AppliedPrice::Open),
            "high" => Ok(AppliedPrice::High),
            "low" => Ok(AppliedPrice::Low),
            "median" => Ok(AppliedPrice::Median),
            "typical" => Ok(AppliedPrice::Typical),
            "weighted" => Ok(AppliedPrice::Weighted),
            other => Err(format!("unknown applied price '{}'", other)),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::MovingAverage {
                period,
                method,
                price,
            } => write!(f, "MA({},{},{})", period, method, price),
            IndicatorKind::Bands {
                period,
                deviation_x100,
                line,
                ..
            } => {
                let dev = *deviation_x100 as f64 / 100.0;
                let line = match line {
                    BandLine::Upper => "upper",
                    BandLine::Middle => "middle",
                    BandLine::Lower => "lower",
                };
                write!(f, "BANDS({},{}).{}", period, dev, line)
            }
            IndicatorKind::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands(line: BandLine) -> IndicatorKind {
        IndicatorKind::Bands {
            period: 20,
            deviation_x100: 200,
            method: MaMethod::Sma,
            price: AppliedPrice::Close,
            line,
        }
    }

    #[test]
    fn display_kinds() {
        assert_eq!(IndicatorKind::Atr(14).to_string(), "ATR(14)");
        assert_eq!(bands(BandLine::Upper).to_string(), "BANDS(20,2).upper");
        let ema = IndicatorKind::MovingAverage {
            period: 200,
            method: MaMethod::Ema,
            price: AppliedPrice::Close,
        };
        assert_eq!(ema.to_string(), "MA(200,ema,close)");
    }

    #[test]
    fn band_lines_share_series_key() {
        assert_eq!(
            bands(BandLine::Upper).series_key(),
            bands(BandLine::Lower).series_key()
        );
        assert_eq!(bands(BandLine::Lower).series_key(), bands(BandLine::Middle));
        assert_eq!(IndicatorKind::Atr(14).series_key(), IndicatorKind::Atr(14));
    }

    #[test]
    fn parse_methods_and_prices() {
        assert_eq!("EMA".parse::<MaMethod>(), Ok(MaMethod::Ema));
        assert_eq!("smoothed".parse::<MaMethod>(), Ok(MaMethod::Smma));
        assert!("hull".parse::<MaMethod>().is_err());
        assert_eq!(" Typical ".parse::<AppliedPrice>(), Ok(AppliedPrice::Typical));
        assert!("vwap".parse::<AppliedPrice>().is_err());
    }

    #[test]
    fn kind_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorKind::Atr(14), "atr");
        map.insert(bands(BandLine::Upper), "upper");
        assert_eq!(map.get(&IndicatorKind::Atr(14)), Some(&"atr"));
        assert_eq!(map.get(&bands(BandLine::Upper)), Some(&"upper"));
        assert_eq!(map.get(&bands(BandLine::Lower)), None);
    }
}
