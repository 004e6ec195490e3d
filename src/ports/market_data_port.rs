//! Market data access port.

use crate::domain::bar::{Bar, Quote};
use crate::domain::indicator::IndicatorKind;

/// Bars and indicator values for a single instrument and timeframe.
///
/// Offset 0 is the forming bar, offset 1 the most recently closed bar.
pub trait MarketDataPort {
    fn bar(&self, offset: usize) -> Option<Bar>;

    /// `None` (or `Some(0.0)`) means the value is unavailable.
    fn indicator(&self, kind: &IndicatorKind, offset: usize) -> Option<f64>;

    fn quote(&self) -> Option<Quote>;

    fn bars_available(&self) -> usize;
}
