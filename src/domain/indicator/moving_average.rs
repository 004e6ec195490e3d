//! Moving averages over an applied-price series.
//!
//! - SMA: arithmetic mean of the last n values.
//! - EMA: k = 2/(n+1), seeded with the first SMA, then EMA[i] = x*k + EMA[i-1]*(1-k).
//! - SMMA: seeded with the first SMA, then (SMMA[i-1]*(n-1) + x) / n.
//! - LWMA: weights 1..=n, newest value weighted n.
//!
//! Warmup: first (n-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{
    AppliedPrice, IndicatorKind, IndicatorPoint, IndicatorSeries, IndicatorValue, MaMethod,
};

/// Raw moving average over `values`; `None` during warmup.
pub fn moving_average(values: &[f64], period: usize, method: MaMethod) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for i in 0..values.len() {
        if i + 1 < period {
            out.push(None);
            continue;
        }
        let window = &values[i + 1 - period..=i];
        let sma = window.iter().sum::<f64>() / period as f64;

        let value = match method {
            MaMethod::Sma => sma,
            MaMethod::Ema => match prev {
                None => sma,
                Some(p) => {
                    let k = 2.0 / (period as f64 + 1.0);
                    values[i] * k + p * (1.0 - k)
                }
            },
            MaMethod::Smma => match prev {
                None => sma,
                Some(p) => (p * (period as f64 - 1.0) + values[i]) / period as f64,
            },
            MaMethod::Lwma => {
                let weight_sum = (period * (period + 1)) as f64 / 2.0;
                window
                    .iter()
                    .enumerate()
                    .map(|(j, v)| v * (j + 1) as f64)
                    .sum::<f64>()
                    / weight_sum
            }
        };
        prev = Some(value);
        out.push(Some(value));
    }
    out
}

pub fn calculate_moving_average(
    bars: &[Bar],
    period: usize,
    method: MaMethod,
    price: AppliedPrice,
) -> IndicatorSeries {
    let prices: Vec<f64> = bars.iter().map(|b| price.of(b)).collect();
    let averaged = moving_average(&prices, period, method);

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
        kind: IndicatorKind::MovingAverage {
            period,
            method,
            price,
        },
        values,
    }
}
