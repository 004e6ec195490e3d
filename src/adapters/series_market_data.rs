//! Market data over an in-memory bar series.
//!
//! The cursor marks the forming bar (offset 0). Indicators are computed on
//! demand over the whole series and cached per series key; every value is
//! causal, so reading at or before the cursor never sees later bars. The
//! quote is synthesized from the forming bar's close plus a fixed spread.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::domain::bar::{Bar, Quote};
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::moving_average::calculate_moving_average;
use crate::domain::indicator::{IndicatorKind, IndicatorSeries};
use crate::ports::market_data_port::MarketDataPort;

pub struct SeriesMarketData {
    bars: Vec<Bar>,
    cursor: usize,
    spread: f64,
    cache: RefCell<HashMap<IndicatorKind, IndicatorSeries>>,
}

impl SeriesMarketData {
    /// The last bar of `bars` is treated as forming. `spread` is in price units.
    pub fn new(bars: Vec<Bar>, spread: f64) -> Self {
        let cursor = bars.len().saturating_sub(1);
        Self {
            bars,
            cursor,
            spread,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the forming bar to `index`. Returns false if out of range.
    pub fn set_cursor(&mut self, index: usize) -> bool {
        if index >= self.bars.len() {
            return false;
        }
        self.cursor = index;
        true
    }

    fn index_of(&self, offset: usize) -> Option<usize> {
        if self.bars.is_empty() {
            return None;
        }
        self.cursor.checked_sub(offset)
    }

    fn compute(&self, key: &IndicatorKind) -> IndicatorSeries {
        match *key {
            IndicatorKind::MovingAverage {
                period,
                method,
                price,
            } => calculate_moving_average(&self.bars, period, method, price),
            IndicatorKind::Bands {
                period,
                deviation_x100,
                method,
                price,
                ..
            } => calculate_bollinger(&self.bars, period, deviation_x100, method, price),
            IndicatorKind::Atr(period) => calculate_atr(&self.bars, period),
        }
    }
}

impl MarketDataPort for SeriesMarketData {
    fn bar(&self, offset: usize) -> Option<Bar> {
        self.index_of(offset).map(|i| self.bars[i].clone())
    }

    fn indicator(&self, kind: &IndicatorKind, offset: usize) -> Option<f64> {
        let index = self.index_of(offset)?;
        let key = kind.series_key();
        if let Some(series) = self.cache.borrow().get(&key) {
            return series.value_at(index, kind);
        }
        let series = self.compute(&key);
        let value = series.value_at(index, kind);
        self.cache.borrow_mut().insert(key, series);
        value
    }

    fn quote(&self) -> Option<Quote> {
        let forming = self.bar(0)?;
        Some(Quote {
            bid: forming.close,
            ask: forming.close + self.spread,
        })
    }

    fn bars_available(&self) -> usize {
        if self.bars.is_empty() { 0 } else { self.cursor + 1 }
    }
}
