//! Deterministic fakes shared by the unit tests.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::bar::{Bar, Quote};
use crate::domain::indicator::IndicatorKind;
use crate::ports::market_data_port::MarketDataPort;

#[derive(Default)]
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
        self.bars.insert(offset, bar(offset, open, high, low, close));
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

/// A bar whose timestamp moves backwards with its offset.
pub fn bar(offset: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
    let base = NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    Bar {
        time: base - chrono::Duration::hours(offset as i64),
        open,
        high,
        low,
        close,
    }
}
