#![allow(dead_code)]

use bandtrader::domain::bar::{Bar, Quote};
use bandtrader::domain::indicator::IndicatorKind;
use bandtrader::ports::market_data_port::MarketDataPort;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::io::Write;

/// A market snapshot with hand-picked bars, indicator values and quote.
#[derive(Default, Clone)]
pub struct FixedMarket {
    bars: HashMap<usize, Bar>,
    values: HashMap<(IndicatorKind, usize), f64>,
    quote: Option<Quote>,
}

impl FixedMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bar(mut self, offset: usize, open: f64, high: f64, low: f64, close: f64) -> Self {
        self.bars.insert(
            offset,
            Bar {
                time: base_time() - Duration::hours(offset as i64),
                open,
                high,
                low,
                close,
            },
        );
        self
    }

    pub fn with_value(mut self, kind: IndicatorKind, offset: usize, value: f64) -> Self {
        self.values.insert((kind, offset), value);
        self
    }

    pub fn with_quote(mut self, bid: f64, ask: f64) -> Self {
        self.quote = Some(Quote { bid, ask });
        self
    }
}

impl MarketDataPort for FixedMarket {
    fn bar(&self, offset: usize) -> Option<Bar> {
        self.bars.get(&offset).cloned()
    }

    fn indicator(&self, kind: &IndicatorKind, offset: usize) -> Option<f64> {
        self.values.get(&(*kind, offset)).copied()
    }

    fn quote(&self) -> Option<Quote> {
        self.quote
    }

    fn bars_available(&self) -> usize {
        self.bars.keys().max().map_or(0, |m| m + 1)
    }
}

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Hourly bars stepping the close by `steps[i]`, each with a fixed
/// 0.0005 wick above and below the body.
pub fn stepped_bars(start: f64, steps: &[f64]) -> Vec<Bar> {
    let t0 = base_time() - Duration::hours(steps.len() as i64);
    let mut close = start;
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let open = close;
            close = open + step;
            Bar {
                time: t0 + Duration::hours(i as i64),
                open,
                high: open.max(close) + 0.0005,
                low: open.min(close) - 0.0005,
                close,
            }
        })
        .collect()
}

/// 120 bars falling 2 points each, then 80 bars rising 2 points each.
pub fn v_shaped_bars() -> Vec<Bar> {
    let mut steps = vec![-0.0002; 120];
    steps.extend(vec![0.0002; 80]);
    stepped_bars(1.1200, &steps)
}

pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("time,open,high,low,close\n");
    for b in bars {
        out.push_str(&format!(
            "{},{:.5},{:.5},{:.5},{:.5}\n",
            b.time.format("%Y-%m-%d %H:%M"),
            b.open,
            b.high,
            b.low,
            b.close
        ));
    }
    out
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
