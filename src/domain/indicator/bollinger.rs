//! Bollinger Bands indicator.
//!
//! - Middle: moving average of the applied price over n periods
//! - Upper: Middle + (deviation × StdDev)
//! - Lower: Middle - (deviation × StdDev)
//!
//! StdDev is the population deviation of the window around the middle band
//! (divides by N, not N-1). Warmup: first (period-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::moving_average::moving_average;
use crate::domain::indicator::{
    AppliedPrice, BandLine, IndicatorKind, IndicatorPoint, IndicatorSeries, IndicatorValue,
    MaMethod,
};

pub fn calculate_bollinger(
    bars: &[Bar],
    period: usize,
    deviation_x100: u32,
    method: MaMethod,
    price: AppliedPrice,
) -> IndicatorSeries {
    let prices: Vec<f64> = bars.iter().map(|b| price.of(b)).collect();
    let middles = moving_average(&prices, period, method);
    let mult = deviation_x100 as f64 / 100.0;

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let point = match middles[i] {
            Some(middle) => {
                let window = &prices[i + 1 - period..=i];
                let variance = window
                    .iter()
                    .map(|p| {
                        let diff = p - middle;
                        diff * diff
                    })
                    .sum::<f64>()
                    / period as f64;
                let stddev = variance.sqrt();
                IndicatorPoint {
                    time: bar.time,
                    valid: true,
                    value: IndicatorValue::Bands {
                        upper: middle + mult * stddev,
                        middle,
                        lower: middle - mult * stddev,
                    },
                }
            }
            None => IndicatorPoint {
                time: bar.time,
                valid: false,
                value: IndicatorValue::Bands {
                    upper: 0.0,
                    middle: 0.0,
                    lower: 0.0,
                },
            },
        };
        values.push(point);
    }

    IndicatorSeries {
        kind: IndicatorKind::Bands {
            period,
            deviation_x100,
            method,
            price,
            line: BandLine::Middle,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                time: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect()
    }

    fn line(series: &IndicatorSeries, i: usize, line: BandLine) -> f64 {
        series
            .value_at(i, &series.kind.with_line(line))
            .expect("valid band value")
    }

    #[test]
    fn bollinger_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&bars, 3, 200, MaMethod::Sma, AppliedPrice::Close);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn bollinger_constant_values_collapse() {
        let bars = make_bars(&[100.0; 5]);
        let series = calculate_bollinger(&bars, 3, 200, MaMethod::Sma, AppliedPrice::Close);

        assert!((line(&series, 2, BandLine::Middle) - 100.0).abs() < f64::EPSILON);
        assert!((line(&series, 2, BandLine::Upper) - 100.0).abs() < f64::EPSILON);
        assert!((line(&series, 2, BandLine::Lower) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 200, MaMethod::Sma, AppliedPrice::Close);

        let expected_middle: f64 = 20.0;
        let variance: f64 = (100.0 + 0.0 + 100.0) / 3.0;
        let stddev = variance.sqrt();

        assert!((line(&series, 2, BandLine::Middle) - expected_middle).abs() < 1e-10);
        assert!((line(&series, 2, BandLine::Upper) - (expected_middle + 2.0 * stddev)).abs() < 1e-10);
        assert!((line(&series, 2, BandLine::Lower) - (expected_middle - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 25.0]);
        let series = calculate_bollinger(&bars, 3, 150, MaMethod::Sma, AppliedPrice::Close);

        let upper = line(&series, 3, BandLine::Upper);
        let middle = line(&series, 3, BandLine::Middle);
        let lower = line(&series, 3, BandLine::Lower);
        assert!(((upper - middle) - (middle - lower)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_kind_records_parameters() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 20, 200, MaMethod::Ema, AppliedPrice::Typical);

        assert_eq!(
            series.kind,
            IndicatorKind::Bands {
                period: 20,
                deviation_x100: 200,
                method: MaMethod::Ema,
                price: AppliedPrice::Typical,
                line: BandLine::Middle,
            }
        );
        assert!(series.values.iter().all(|p| !p.valid));
    }
}
