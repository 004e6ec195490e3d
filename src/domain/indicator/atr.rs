//! Average True Range.
//!
//! TR[0] = high - low, TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR[i] = simple mean of the last n true ranges.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::moving_average::moving_average;
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries, IndicatorValue, MaMethod};

pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| match i {
            0 => bar.range(),
            _ => bar.true_range(bars[i - 1].close),
        })
        .collect()
}

pub fn calculate_atr(bars: &[Bar], period: usize) -> IndicatorSeries {
    let averaged = moving_average(&true_ranges(bars), period, MaMethod::Sma);

    let values = bars
        .iter()
        .zip(averaged)
        .map(|(bar, v)| IndicatorPoint {
            time: bar.time,
            valid: v.is_some(),
            value: IndicatorValue::Simple(v.unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        kind: IndicatorKind::Atr(period),
        values,
    }
}
