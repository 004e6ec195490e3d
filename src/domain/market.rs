//! Per-cycle view over the market data port.
//!
//! Zero or non-finite values are treated as unavailable. Lookups are
//! memoized per `(kind, offset)` so one evaluation cycle always sees the
//! same numbers, whatever the provider does between calls.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::domain::bar::{Bar, Quote};
use crate::domain::indicator::IndicatorKind;
use crate::ports::market_data_port::MarketDataPort;

pub struct MarketView<'a> {
    port: &'a dyn MarketDataPort,
    values: RefCell<HashMap<(IndicatorKind, usize), Option<f64>>>,
    bars: RefCell<HashMap<usize, Option<Bar>>>,
}

impl<'a> MarketView<'a> {
    pub fn new(port: &'a dyn MarketDataPort) -> Self {
        Self {
            port,
            values: RefCell::new(HashMap::new()),
            bars: RefCell::new(HashMap::new()),
        }
    }

    pub fn value(&self, kind: &IndicatorKind, offset: usize) -> Option<f64> {
        if let Some(cached) = self.values.borrow().get(&(*kind, offset)) {
            return *cached;
        }
        let fetched = self
            .port
            .indicator(kind, offset)
            .filter(|v| v.is_finite() && *v != 0.0);
        self.values.borrow_mut().insert((*kind, offset), fetched);
        fetched
    }

    pub fn bar(&self, offset: usize) -> Option<Bar> {
        if let Some(cached) = self.bars.borrow().get(&offset) {
            return cached.clone();
        }
        let fetched = self.port.bar(offset);
        self.bars.borrow_mut().insert(offset, fetched.clone());
        fetched
    }

    pub fn quote(&self) -> Option<Quote> {
        self.port
            .quote()
            .filter(|q| q.bid > 0.0 && q.ask > 0.0)
    }

    pub fn bars_available(&self) -> usize {
        self.port.bars_available()
    }
}
